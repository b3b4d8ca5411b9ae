//! GPU program setup and per-frame draw calls.
//!
//! The pipeline is written against the narrow [`GlApi`] seam so the state
//! machine and error handling can be exercised on the host; the wasm build
//! implements the trait on `WebGl2RenderingContext`. Initialization walks
//! `Uninitialized -> ShadersCompiled -> ProgramLinked -> Ready` and any
//! compile, link, or queued GPU error aborts it: the `Ready` state is never
//! reached partially.

use thiserror::Error;

use crate::frame::{self, Frame};

/// GL error code for an empty error queue.
pub const GL_NO_ERROR: u32 = 0;

/// Upper bound on error-queue polls per drain. A lost context can keep
/// reporting errors indefinitely.
const MAX_ERROR_POLLS: usize = 32;

/// Vertex stage maps the static quad from pixel space to clip space and hands
/// the texture coordinate to the fragment stage, which samples the frame.
pub const VERTEX_SHADER_SOURCE: &str = r#"#version 300 es
in vec2 coordinates;
out vec2 v_uv;

void main() {
    v_uv = vec2((coordinates.x + 1.0) * 0.5, (1.0 - coordinates.y) * 0.5);
    gl_Position = vec4(coordinates, 0.0, 1.0);
}
"#;

pub const FRAGMENT_SHADER_SOURCE: &str = r#"#version 300 es
precision mediump float;

uniform sampler2D frame;
in vec2 v_uv;
out vec4 frag_color;

void main() {
    frag_color = texture(frame, v_uv);
}
"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },
    #[error("shader program failed to link: {log}")]
    ProgramLink { log: String },
    #[error("GPU reported error codes {codes:?}")]
    Gpu { codes: Vec<u32> },
    #[error("attribute {name:?} missing from linked program")]
    MissingAttribute { name: &'static str },
    #[error("rendering context was lost")]
    ContextLost,
    #[error("draw call issued before the pipeline was ready")]
    NotReady,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    ShadersCompiled,
    ProgramLinked,
    Ready,
}

/// The GL calls the pipeline needs, with driver object handles as associated
/// types. Creation returns `None` only when the context is lost.
pub trait GlApi {
    type Shader;
    type Program;
    type Buffer;
    type Texture;

    fn new_shader(&self, stage: ShaderStage) -> Option<Self::Shader>;
    fn compile(&self, shader: &Self::Shader, source: &str);
    fn compile_ok(&self, shader: &Self::Shader) -> bool;
    fn compile_log(&self, shader: &Self::Shader) -> String;

    fn new_program(&self) -> Option<Self::Program>;
    fn link(&self, program: &Self::Program, vertex: &Self::Shader, fragment: &Self::Shader);
    fn link_ok(&self, program: &Self::Program) -> bool;
    fn link_log(&self, program: &Self::Program) -> String;
    fn activate(&self, program: &Self::Program);
    fn attrib_location(&self, program: &Self::Program, name: &str) -> i32;

    fn new_buffer(&self) -> Option<Self::Buffer>;
    /// Uploads with `STATIC_DRAW` semantics; the quad never changes.
    fn upload_vertices(&self, buffer: &Self::Buffer, data: &[f32]);
    fn upload_indices(&self, buffer: &Self::Buffer, data: &[u16]);
    fn point_attrib_at_vertices(&self, location: u32, components: i32);

    fn new_texture(&self) -> Option<Self::Texture>;
    /// Binds the texture, applies nearest filtering, uploads RGBA pixels.
    fn upload_frame_texture(&self, texture: &Self::Texture, width: i32, height: i32, pixels: &[u8]);

    fn set_viewport(&self, width: i32, height: i32);
    fn clear_screen(&self, r: f32, g: f32, b: f32, a: f32);
    fn draw_triangles(&self, index_count: i32);

    /// Pops one code from the GL error queue; `GL_NO_ERROR` when empty.
    fn poll_error(&self) -> u32;
}

/// Maps a pixel-space coordinate on the 160x144 screen to unit clip space.
/// `[0,1]` remaps to `[-1,1]`; y flips because rows run top-to-bottom.
pub fn pixel_to_clip(x: f32, y: f32) -> [f32; 2] {
    [
        x / frame::WIDTH as f32 * 2.0 - 1.0,
        1.0 - y / frame::HEIGHT as f32 * 2.0,
    ]
}

/// Full-screen quad authored in pixel space, two triangles.
fn quad_vertices() -> [f32; 8] {
    let corners = [
        pixel_to_clip(0.0, 0.0),
        pixel_to_clip(frame::WIDTH as f32, 0.0),
        pixel_to_clip(frame::WIDTH as f32, frame::HEIGHT as f32),
        pixel_to_clip(0.0, frame::HEIGHT as f32),
    ];
    let mut out = [0.0; 8];
    for (i, [x, y]) in corners.into_iter().enumerate() {
        out[i * 2] = x;
        out[i * 2 + 1] = y;
    }
    out
}

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];
const COORDINATES_ATTRIB: &str = "coordinates";

pub struct ShaderPipeline<G: GlApi> {
    gl: G,
    state: PipelineState,
    viewport: (i32, i32),
    program: Option<G::Program>,
    geometry: Option<(G::Buffer, G::Buffer)>,
    frame_texture: Option<G::Texture>,
}

impl<G: GlApi> ShaderPipeline<G> {
    pub fn new(gl: G, viewport: (i32, i32)) -> Self {
        Self {
            gl,
            state: PipelineState::Uninitialized,
            viewport,
            program: None,
            geometry: None,
            frame_texture: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Compiles, links, and validates the program, then uploads the static
    /// quad. On error the pipeline stays in whatever pre-`Ready` state it had
    /// reached and must not be drawn with.
    pub fn initialize(&mut self) -> Result<(), PipelineError> {
        self.initialize_with_sources(VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE)
    }

    pub fn initialize_with_sources(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<(), PipelineError> {
        let vertex = self.compile_stage(ShaderStage::Vertex, vertex_source)?;
        let fragment = self.compile_stage(ShaderStage::Fragment, fragment_source)?;
        self.state = PipelineState::ShadersCompiled;

        let program = self.link_program(&vertex, &fragment)?;
        self.state = PipelineState::ProgramLinked;

        self.upload_geometry(&program)?;
        self.program = Some(program);
        self.state = PipelineState::Ready;
        Ok(())
    }

    /// Binds the frame as a texture, sets the viewport to the canvas
    /// dimensions, and issues one indexed draw of the quad.
    pub fn draw(&mut self, frame: &Frame) -> Result<(), PipelineError> {
        if self.state != PipelineState::Ready {
            return Err(PipelineError::NotReady);
        }
        let texture = self.frame_texture.as_ref().ok_or(PipelineError::NotReady)?;

        self.gl.upload_frame_texture(
            texture,
            frame::WIDTH as i32,
            frame::HEIGHT as i32,
            frame.pixels(),
        );
        self.check_errors()?;

        let (width, height) = self.viewport;
        self.gl.set_viewport(width, height);
        self.gl.clear_screen(0.0, 0.0, 0.0, 1.0);
        self.gl.draw_triangles(QUAD_INDICES.len() as i32);
        self.check_errors()
    }

    /// Drains the GL error queue. Every code seen is aggregated into the
    /// returned `Gpu` error; earlier codes are never discarded when a later
    /// poll comes back clean.
    pub fn check_errors(&self) -> Result<(), PipelineError> {
        let mut codes = Vec::new();
        for _ in 0..MAX_ERROR_POLLS {
            match self.gl.poll_error() {
                GL_NO_ERROR => break,
                code => codes.push(code),
            }
        }
        if codes.is_empty() {
            Ok(())
        } else {
            Err(PipelineError::Gpu { codes })
        }
    }

    fn compile_stage(
        &self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<G::Shader, PipelineError> {
        let shader = self
            .gl
            .new_shader(stage)
            .ok_or(PipelineError::ContextLost)?;
        self.gl.compile(&shader, source);
        if !self.gl.compile_ok(&shader) {
            return Err(PipelineError::ShaderCompile {
                stage,
                log: self.gl.compile_log(&shader),
            });
        }
        self.check_errors()?;
        Ok(shader)
    }

    fn link_program(
        &self,
        vertex: &G::Shader,
        fragment: &G::Shader,
    ) -> Result<G::Program, PipelineError> {
        let program = self.gl.new_program().ok_or(PipelineError::ContextLost)?;
        self.gl.link(&program, vertex, fragment);
        if !self.gl.link_ok(&program) {
            return Err(PipelineError::ProgramLink {
                log: self.gl.link_log(&program),
            });
        }
        self.check_errors()?;
        Ok(program)
    }

    fn upload_geometry(&mut self, program: &G::Program) -> Result<(), PipelineError> {
        self.gl.activate(program);

        let location = self.gl.attrib_location(program, COORDINATES_ATTRIB);
        if location < 0 {
            return Err(PipelineError::MissingAttribute {
                name: COORDINATES_ATTRIB,
            });
        }

        let vertices = self.gl.new_buffer().ok_or(PipelineError::ContextLost)?;
        self.gl.upload_vertices(&vertices, &quad_vertices());
        let indices = self.gl.new_buffer().ok_or(PipelineError::ContextLost)?;
        self.gl.upload_indices(&indices, &QUAD_INDICES);
        self.gl.point_attrib_at_vertices(location as u32, 2);
        self.check_errors()?;

        let texture = self.gl.new_texture().ok_or(PipelineError::ContextLost)?;
        self.geometry = Some((vertices, indices));
        self.frame_texture = Some(texture);
        Ok(())
    }
}
