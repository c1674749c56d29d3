use std::fmt;

/// Pipeline stage a [`CompiledUnit`](crate::CompiledUnit) is built for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<programconfig::StageKind> for ShaderStage {
    fn from(kind: programconfig::StageKind) -> Self {
        match kind {
            programconfig::StageKind::Vertex => ShaderStage::Vertex,
            programconfig::StageKind::Fragment => ShaderStage::Fragment,
        }
    }
}

/// Primitive assembly mode used to interpret an index stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

/// Components per vertex for position and normal streams (`vec4`).
pub const VERTEX_COMPONENTS: i32 = 4;
