//! WebGL2 presenter: [`GlApi`] implemented on the real browser context.

use js_sys::{Float32Array, Uint16Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlTexture,
};

use super::controller::Present;
use crate::config::ConfigError;
use crate::frame::{self, Frame};
use crate::pipeline::{GlApi, ShaderPipeline, ShaderStage};

/// Integer upscale applied to the emulator's native resolution.
pub const SCALE_FACTOR: u32 = 3;

impl GlApi for GL {
    type Shader = WebGlShader;
    type Program = WebGlProgram;
    type Buffer = WebGlBuffer;
    type Texture = WebGlTexture;

    fn new_shader(&self, stage: ShaderStage) -> Option<WebGlShader> {
        let kind = match stage {
            ShaderStage::Vertex => GL::VERTEX_SHADER,
            ShaderStage::Fragment => GL::FRAGMENT_SHADER,
        };
        self.create_shader(kind)
    }

    fn compile(&self, shader: &WebGlShader, source: &str) {
        self.shader_source(shader, source);
        self.compile_shader(shader);
    }

    fn compile_ok(&self, shader: &WebGlShader) -> bool {
        self.get_shader_parameter(shader, GL::COMPILE_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn compile_log(&self, shader: &WebGlShader) -> String {
        self.get_shader_info_log(shader).unwrap_or_default()
    }

    fn new_program(&self) -> Option<WebGlProgram> {
        self.create_program()
    }

    fn link(&self, program: &WebGlProgram, vertex: &WebGlShader, fragment: &WebGlShader) {
        self.attach_shader(program, vertex);
        self.attach_shader(program, fragment);
        self.link_program(program);
    }

    fn link_ok(&self, program: &WebGlProgram) -> bool {
        self.get_program_parameter(program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
    }

    fn link_log(&self, program: &WebGlProgram) -> String {
        self.get_program_info_log(program).unwrap_or_default()
    }

    fn activate(&self, program: &WebGlProgram) {
        self.use_program(Some(program));
    }

    fn attrib_location(&self, program: &WebGlProgram, name: &str) -> i32 {
        self.get_attrib_location(program, name)
    }

    fn new_buffer(&self) -> Option<WebGlBuffer> {
        self.create_buffer()
    }

    fn upload_vertices(&self, buffer: &WebGlBuffer, data: &[f32]) {
        self.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
        let view = Float32Array::from(data);
        self.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &view, GL::STATIC_DRAW);
    }

    fn upload_indices(&self, buffer: &WebGlBuffer, data: &[u16]) {
        self.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(buffer));
        let view = Uint16Array::from(data);
        self.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &view, GL::STATIC_DRAW);
    }

    fn point_attrib_at_vertices(&self, location: u32, components: i32) {
        self.enable_vertex_attrib_array(location);
        self.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
    }

    fn new_texture(&self) -> Option<WebGlTexture> {
        self.create_texture()
    }

    fn upload_frame_texture(&self, texture: &WebGlTexture, width: i32, height: i32, pixels: &[u8]) {
        self.bind_texture(GL::TEXTURE_2D, Some(texture));
        self.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::NEAREST as i32);
        self.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::NEAREST as i32);
        self.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        self.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);
        // Upload failures surface through the error queue, drained by the
        // pipeline right after this call.
        let _ = self.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            GL::RGBA as i32,
            width,
            height,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            Some(pixels),
        );
    }

    fn set_viewport(&self, width: i32, height: i32) {
        self.viewport(0, 0, width, height);
    }

    fn clear_screen(&self, r: f32, g: f32, b: f32, a: f32) {
        self.clear_color(r, g, b, a);
        self.clear(GL::COLOR_BUFFER_BIT);
    }

    fn draw_triangles(&self, index_count: i32) {
        self.draw_elements_with_i32(GL::TRIANGLES, index_count, GL::UNSIGNED_SHORT, 0);
    }

    fn poll_error(&self) -> u32 {
        self.get_error()
    }
}

pub struct WebGlPresenter {
    pipeline: ShaderPipeline<GL>,
}

impl WebGlPresenter {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let width = frame::WIDTH as u32 * SCALE_FACTOR;
        let height = frame::HEIGHT as u32 * SCALE_FACTOR;
        canvas.set_width(width);
        canvas.set_height(height);

        let gl: GL = canvas
            .get_context("webgl2")
            .map_err(|_| ConfigError::NoContext("webgl2").to_string())?
            .ok_or_else(|| ConfigError::NoContext("webgl2").to_string())?
            .dyn_into()?;

        let mut pipeline = ShaderPipeline::new(gl, (width as i32, height as i32));
        pipeline
            .initialize()
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        Ok(Self { pipeline })
    }

    pub fn state(&self) -> crate::pipeline::PipelineState {
        self.pipeline.state()
    }
}

impl Present for WebGlPresenter {
    fn present(&mut self, frame: &Frame) -> Result<(), JsValue> {
        self.pipeline
            .draw(frame)
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }
}
