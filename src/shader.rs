//! Shader stage compilation and program linking.
//!
//! Stages are written in GLSL and translated for the GPU backend through
//! naga: parse, validate, then write WGSL. A stage that fails to compile
//! reports its diagnostic through the log and leaves the program
//! un-linkable; the viewer keeps running with an empty pipeline set
//! instead of aborting.

use std::borrow::Cow;

/// Shader stage kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn naga_stage(self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }

    fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Result of compiling one GLSL stage.
///
/// Holds the WGSL translation on success, or the diagnostic text on
/// failure. Either way the stage is inert until linked into a program.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    wgsl: Option<String>,
    diagnostic: Option<String>,
}

impl CompiledStage {
    pub fn is_ok(&self) -> bool {
        self.wgsl.is_some()
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Diagnostic text from a failed compile, if any.
    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }
}

/// Compile a single GLSL stage to WGSL.
///
/// Compilation failure is not fatal: the diagnostic is logged and kept on
/// the returned stage.
pub fn compile_stage(source: &str, stage: ShaderStage) -> CompiledStage {
    match translate(source, stage) {
        Ok(wgsl) => CompiledStage {
            stage,
            wgsl: Some(wgsl),
            diagnostic: None,
        },
        Err(diagnostic) => {
            log::error!("{} shader compilation failed:\n{diagnostic}", stage.name());
            CompiledStage {
                stage,
                wgsl: None,
                diagnostic: Some(diagnostic),
            }
        }
    }
}

fn translate(source: &str, stage: ShaderStage) -> Result<String, String> {
    let options = naga::front::glsl::Options {
        stage: stage.naga_stage(),
        defines: naga::FastHashMap::default(),
    };

    let mut frontend = naga::front::glsl::Frontend::default();
    let module = frontend
        .parse(&options, source)
        .map_err(|errors| format!("GLSL parse error:\n{errors}"))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    let module_info = validator
        .validate(&module)
        .map_err(|e| format!("Validation error: {e}"))?;

    naga::back::wgsl::write_string(
        &module,
        &module_info,
        naga::back::wgsl::WriterFlags::empty(),
    )
    .map_err(|e| format!("WGSL generation error: {e}"))
}

/// A vertex and fragment stage pair, linked into GPU modules on demand.
#[derive(Debug)]
pub struct ShaderProgram {
    vertex: CompiledStage,
    fragment: CompiledStage,
}

/// GPU shader modules produced by a successful link.
pub struct ShaderModules {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

impl ShaderProgram {
    /// Compile both stages. Failures are logged per stage and recorded;
    /// the program is still constructed.
    pub fn build(vertex_source: &str, fragment_source: &str) -> Self {
        let vertex = compile_stage(vertex_source, ShaderStage::Vertex);
        let fragment = compile_stage(fragment_source, ShaderStage::Fragment);

        let program = Self { vertex, fragment };
        if !program.is_linked() {
            log::error!("shader program is incomplete; rendering will be skipped");
        }
        program
    }

    /// Whether both stages compiled and the program can produce modules.
    pub fn is_linked(&self) -> bool {
        self.vertex.is_ok() && self.fragment.is_ok()
    }

    pub fn vertex(&self) -> &CompiledStage {
        &self.vertex
    }

    pub fn fragment(&self) -> &CompiledStage {
        &self.fragment
    }

    /// Create the GPU shader modules, consuming the compiled sources.
    ///
    /// Returns `None` when either stage failed to compile.
    pub fn into_modules(self, device: &wgpu::Device) -> Option<ShaderModules> {
        let vertex_wgsl = self.vertex.wgsl?;
        let fragment_wgsl = self.fragment.wgsl?;

        let vertex = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(vertex_wgsl)),
        });
        let fragment = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Owned(fragment_wgsl)),
        });

        Some(ShaderModules { vertex, fragment })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_FRAGMENT: &str = r#"#version 450
layout(location = 0) out vec4 out_color;

void main() {
    out_color = vec4(1.0, 0.0, 0.0, 1.0);
}
"#;

    #[test]
    fn test_valid_stage_compiles() {
        let compiled = compile_stage(VALID_FRAGMENT, ShaderStage::Fragment);
        assert!(compiled.is_ok());
        assert!(compiled.diagnostic().is_none());
        assert_eq!(compiled.stage(), ShaderStage::Fragment);
    }

    #[test]
    fn test_syntax_error_is_non_fatal() {
        let broken = r#"#version 450
layout(location = 0) out vec4 out_color;

void main() {
    out_color = vec4(1.0, 0.0, 0.0, 1.0  // missing paren and semicolon
}
"#;
        let compiled = compile_stage(broken, ShaderStage::Fragment);
        assert!(!compiled.is_ok());
        let diagnostic = compiled.diagnostic().unwrap();
        assert!(!diagnostic.is_empty());
    }

    #[test]
    fn test_program_links_when_both_stages_compile() {
        let vertex = r#"#version 450
layout(location = 0) in vec2 position;

void main() {
    gl_Position = vec4(position, 0.0, 1.0);
}
"#;
        let program = ShaderProgram::build(vertex, VALID_FRAGMENT);
        assert!(program.is_linked());
    }

    #[test]
    fn test_program_with_broken_stage_reports_not_linked() {
        let program = ShaderProgram::build("not glsl at all", VALID_FRAGMENT);
        assert!(!program.is_linked());
        assert!(!program.vertex().is_ok());
        assert!(program.fragment().is_ok());
        assert!(program.vertex().diagnostic().is_some());
    }
}
