use anyhow::{Context, Result};
use glob::glob;
use std::fs::{read_to_string, write};
use std::path::PathBuf;

struct ShaderData {
    src: String,
    src_path: PathBuf,
    spv_path: PathBuf,
    kind: shaderc::ShaderKind,
}

impl ShaderData {
    fn load(src_path: PathBuf) -> Result<Self> {
        let extension = src_path
            .extension()
            .context("File has no extension")?
            .to_str()
            .context("Extension cannot be converted to &str")?;
        let kind = match extension {
            "vert" => shaderc::ShaderKind::Vertex,
            "frag" => shaderc::ShaderKind::Fragment,
            "comp" => shaderc::ShaderKind::Compute,
            _ => anyhow::bail!("Unsupported shader: {}", src_path.display()),
        };
        let src = read_to_string(src_path.clone())
            .with_context(|| format!("Failed to read {}", src_path.display()))?;
        let spv_path = src_path.with_extension(format!("{}.spv", extension));
        Ok(Self { src, src_path, spv_path, kind })
    }
}

fn main() -> Result<()> {
    let mut shader_paths = Vec::new();
    shader_paths.extend(glob("./src/**/*.vert")?);
    shader_paths.extend(glob("./src/**/*.frag")?);
    shader_paths.extend(glob("./src/**/*.comp")?);

    let shaders = shader_paths
        .into_iter()
        .map(|path| ShaderData::load(path?))
        .collect::<Result<Vec<_>>>()?;

    let mut compiler = shaderc::Compiler::new().context("Unable to create shader compiler")?;

    for shader in shaders {
        println!("cargo:rerun-if-changed={}", shader.src_path.display());
        let file_name = shader.src_path.to_string_lossy();
        let compiled = compiler
            .compile_into_spirv(&shader.src, shader.kind, &file_name, "main", None)
            .with_context(|| format!("Failed to compile {}", shader.src_path.display()))?;
        write(&shader.spv_path, compiled.as_binary_u8())?;
    }

    Ok(())
}
