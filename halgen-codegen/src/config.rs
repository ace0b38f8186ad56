/// Settings shared by synthesis and rendering of every table in a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodegenConfig {
    /// Prefix of every self and related-resource reference, e.g. `/api/2.0/`
    pub api_path: String,
    /// Module path the generated code imports `Db`, `NamedArgs` and friends from
    pub support_module: Vec<String>,
}

impl CodegenConfig {
    pub const DEFAULT_API_PATH: &'static str = "/api/2.0/";
    pub const DEFAULT_SUPPORT_MODULE: &'static str = "crate::db";

    pub fn new<P, M>(api_path: P, support_module: M) -> Self
    where
        P: Into<String>,
        M: AsRef<str>,
    {
        Self {
            api_path: api_path.into(),
            support_module: support_module
                .as_ref()
                .split("::")
                .map(|segment| segment.trim().to_owned())
                .collect(),
        }
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_API_PATH, Self::DEFAULT_SUPPORT_MODULE)
    }
}
