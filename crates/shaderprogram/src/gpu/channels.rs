//! Fixed vocabulary of named shader inputs.
//!
//! The names below are the contract between this crate and shader source text.
//! A shader that spells an input differently (or omits it) simply leaves that
//! channel absent; every setter for an absent channel is a no-op.

/// Per-vertex attribute streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    Position,
    Normal,
    /// Resolved at link time but never bound by `draw`; colour reaches the
    /// shader through [`Uniform::Color`].
    Color,
}

impl Attribute {
    pub const COUNT: usize = 3;
    pub const ALL: [Attribute; Self::COUNT] =
        [Attribute::Position, Attribute::Normal, Attribute::Color];

    pub const fn name(self) -> &'static str {
        match self {
            Attribute::Position => "vs_Pos",
            Attribute::Normal => "vs_Nor",
            Attribute::Color => "vs_Col",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// Per-draw and per-object uniform values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Uniform {
    Model,
    ModelInvTr,
    ViewProj,
    Color,
    Time,
    HeightsInfo,
    CameraPosition,
    ShaderVariant,
    Octaves,
    Bias,
    Frequency,
    Height,
    Speed,
}

impl Uniform {
    pub const COUNT: usize = 13;
    pub const ALL: [Uniform; Self::COUNT] = [
        Uniform::Model,
        Uniform::ModelInvTr,
        Uniform::ViewProj,
        Uniform::Color,
        Uniform::Time,
        Uniform::HeightsInfo,
        Uniform::CameraPosition,
        Uniform::ShaderVariant,
        Uniform::Octaves,
        Uniform::Bias,
        Uniform::Frequency,
        Uniform::Height,
        Uniform::Speed,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Uniform::Model => "u_Model",
            Uniform::ModelInvTr => "u_ModelInvTr",
            Uniform::ViewProj => "u_ViewProj",
            Uniform::Color => "u_Color",
            Uniform::Time => "u_Time",
            Uniform::HeightsInfo => "u_HeightsInfo",
            Uniform::CameraPosition => "u_CamPos",
            Uniform::ShaderVariant => "u_Shader",
            Uniform::Octaves => "u_Octave",
            Uniform::Bias => "u_Bias",
            Uniform::Frequency => "u_Freq",
            Uniform::Height => "u_Height",
            Uniform::Speed => "u_Speed",
        }
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}
