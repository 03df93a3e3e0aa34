//! The concrete build request handed over by the resolver.
//!
//! A [`Spec`] is plain data: the package version, the compiler identity,
//! the CMake build type, raw variant assignments and whatever the resolver
//! already knows about external dependencies. It is never mutated by the
//! translator; validation produces a separate [`ResolvedSpec`] view.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::errors::ValidationError;
use crate::core::variant::{RawValue, ResolvedVariants, VariantSchema, VariantValue};

/// Compiler family, the part of the compiler identity conditions key on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CompilerFamily {
    Gcc,
    Clang,
    Other(String),
}

impl CompilerFamily {
    pub fn as_str(&self) -> &str {
        match self {
            CompilerFamily::Gcc => "gcc",
            CompilerFamily::Clang => "clang",
            CompilerFamily::Other(name) => name,
        }
    }
}

impl fmt::Display for CompilerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compiler identity in resolver syntax: `gcc`, `gcc@9.3.0`, `clang@12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Compiler {
    pub family: CompilerFamily,
    pub version: Option<String>,
}

impl Compiler {
    pub fn gcc() -> Self {
        Compiler {
            family: CompilerFamily::Gcc,
            version: None,
        }
    }

    pub fn clang() -> Self {
        Compiler {
            family: CompilerFamily::Clang,
            version: None,
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::gcc()
    }
}

impl FromStr for Compiler {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('%');
        let (name, version) = match s.split_once('@') {
            Some((name, version)) => (name, Some(version)),
            None => (s, None),
        };

        if name.is_empty() {
            return Err(format!("invalid compiler `{}`: missing compiler name", s));
        }
        if version.is_some_and(str::is_empty) {
            return Err(format!("invalid compiler `{}`: empty version", s));
        }

        let family = match name {
            "gcc" => CompilerFamily::Gcc,
            "clang" => CompilerFamily::Clang,
            other => CompilerFamily::Other(other.to_string()),
        };

        Ok(Compiler {
            family,
            version: version.map(str::to_string),
        })
    }
}

impl TryFrom<String> for Compiler {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Compiler> for String {
    fn from(c: Compiler) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.family, version),
            None => write!(f, "{}", self.family),
        }
    }
}

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildType {
    Debug,
    Release,
    #[default]
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debug" => Ok(BuildType::Debug),
            "Release" => Ok(BuildType::Release),
            "RelWithDebInfo" => Ok(BuildType::RelWithDebInfo),
            "MinSizeRel" => Ok(BuildType::MinSizeRel),
            _ => Err(format!(
                "invalid build type `{}`: expected Debug, Release, RelWithDebInfo or MinSizeRel",
                s
            )),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the resolver knows about an already-concretized dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvedDependency {
    pub version: Option<String>,
    pub prefix: Option<PathBuf>,
    /// C++ compiler the dependency was built with (Kokkos exposes this).
    pub cxx: Option<PathBuf>,
}

fn default_version() -> String {
    "stable".to_string()
}

/// One build request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spec {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub compiler: Compiler,

    #[serde(default)]
    pub build_type: BuildType,

    /// Host architecture name, informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default)]
    pub variants: BTreeMap<String, RawValue>,

    #[serde(default)]
    pub dependencies: BTreeMap<String, ResolvedDependency>,
}

impl Default for Spec {
    fn default() -> Self {
        Spec {
            version: default_version(),
            compiler: Compiler::default(),
            build_type: BuildType::default(),
            target: None,
            variants: BTreeMap::new(),
            dependencies: BTreeMap::new(),
        }
    }
}

impl Spec {
    pub fn new(version: impl Into<String>) -> Self {
        Spec {
            version: version.into(),
            ..Spec::default()
        }
    }

    pub fn with_compiler(mut self, compiler: Compiler) -> Self {
        self.compiler = compiler;
        self
    }

    pub fn with_build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Assign a variant.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.variants.insert(name.into(), value.into());
        self
    }

    pub fn with_dependency(mut self, name: impl Into<String>, dep: ResolvedDependency) -> Self {
        self.dependencies.insert(name.into(), dep);
        self
    }

    /// Apply variant tokens (`+name`, `~name`, `name=value`).
    pub fn with_tokens<'a>(
        mut self,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, String> {
        for token in tokens {
            let (name, value) = parse_variant_token(token)?;
            self.variants.insert(name, value);
        }
        Ok(self)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Validate every assignment against `schema` and apply defaults.
    pub fn resolve(&self, schema: &VariantSchema) -> Result<ResolvedSpec<'_>, ValidationError> {
        let variants = schema.resolve(&self.variants)?;
        Ok(ResolvedSpec {
            spec: self,
            variants,
        })
    }
}

impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "legion@{}%{} build_type={}",
            self.version, self.compiler, self.build_type
        )?;
        for (name, value) in &self.variants {
            match value {
                RawValue::Bool(true) => write!(f, " +{}", name)?,
                RawValue::Bool(false) => write!(f, " ~{}", name)?,
                other => write!(f, " {}={}", name, other)?,
            }
        }
        if let Some(target) = &self.target {
            write!(f, " target={}", target)?;
        }
        Ok(())
    }
}

/// Parse one variant token in resolver syntax.
pub fn parse_variant_token(token: &str) -> Result<(String, RawValue), String> {
    let token = token.trim();

    let (name, value) = if let Some(name) = token.strip_prefix('+') {
        (name, RawValue::Bool(true))
    } else if let Some(name) = token.strip_prefix('~') {
        (name, RawValue::Bool(false))
    } else if let Some((name, value)) = token.split_once('=') {
        (name, RawValue::Str(value.to_string()))
    } else {
        return Err(format!(
            "invalid variant `{}`: expected `+name`, `~name` or `name=value`",
            token
        ));
    };

    if name.is_empty() {
        return Err(format!("invalid variant `{}`: missing name", token));
    }

    Ok((name.to_string(), value))
}

/// A spec whose variants have all been validated and defaulted.
#[derive(Debug, Clone)]
pub struct ResolvedSpec<'a> {
    pub spec: &'a Spec,
    pub variants: ResolvedVariants,
}

impl ResolvedSpec<'_> {
    pub fn compiler(&self) -> &Compiler {
        &self.spec.compiler
    }

    pub fn enabled(&self, name: &str) -> bool {
        self.variants.enabled(name)
    }

    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.variants.has_value(name, value)
    }

    pub fn value(&self, name: &str) -> Option<&VariantValue> {
        self.variants.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_parse() {
        let c: Compiler = "gcc@9.3.0".parse().unwrap();
        assert_eq!(c.family, CompilerFamily::Gcc);
        assert_eq!(c.version.as_deref(), Some("9.3.0"));
        assert_eq!(c.to_string(), "gcc@9.3.0");

        let c: Compiler = "%clang".parse().unwrap();
        assert_eq!(c, Compiler::clang());

        let c: Compiler = "intel@19".parse().unwrap();
        assert_eq!(c.family, CompilerFamily::Other("intel".to_string()));

        assert!("@9".parse::<Compiler>().is_err());
        assert!("gcc@".parse::<Compiler>().is_err());
    }

    #[test]
    fn test_build_type_parse() {
        assert_eq!("Debug".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert!("debug".parse::<BuildType>().is_err());
        assert_eq!(BuildType::default(), BuildType::RelWithDebInfo);
    }

    #[test]
    fn test_variant_tokens() {
        assert_eq!(
            parse_variant_token("+cuda").unwrap(),
            ("cuda".to_string(), RawValue::Bool(true))
        );
        assert_eq!(
            parse_variant_token("~zlib").unwrap(),
            ("zlib".to_string(), RawValue::Bool(false))
        );
        assert_eq!(
            parse_variant_token("gasnet_root=/opt/gasnet").unwrap(),
            ("gasnet_root".to_string(), RawValue::Str("/opt/gasnet".to_string()))
        );
        assert!(parse_variant_token("cuda").is_err());
        assert!(parse_variant_token("+").is_err());
        assert!(parse_variant_token("=80").is_err());
    }

    #[test]
    fn test_with_tokens_overrides_assignments() {
        let spec = Spec::default()
            .with("cuda_arch", "60")
            .with_tokens(["+cuda", "cuda_arch=80", "~zlib"])
            .unwrap();
        assert_eq!(spec.variants["cuda"], RawValue::Bool(true));
        assert_eq!(spec.variants["cuda_arch"], RawValue::from("80"));
        assert_eq!(spec.variants["zlib"], RawValue::Bool(false));

        assert!(Spec::default().with_tokens(["cuda"]).is_err());
    }

    #[test]
    fn test_spec_from_toml() {
        let spec = Spec::from_toml_str(
            r#"
version = "21.03.0"
compiler = "clang@12.0.1"
build_type = "Debug"

[variants]
network = "gasnet"
conduit = "ibv"
cuda = true
max_fields = 100

[dependencies.kokkos]
version = "3.3.01"
cxx = "/opt/kokkos/bin/nvcc_wrapper"
"#,
        )
        .unwrap();

        assert_eq!(spec.version, "21.03.0");
        assert_eq!(spec.compiler.family, CompilerFamily::Clang);
        assert_eq!(spec.build_type, BuildType::Debug);
        assert_eq!(spec.variants["cuda"], RawValue::Bool(true));
        assert_eq!(spec.variants["max_fields"], RawValue::Int(100));
        assert_eq!(
            spec.dependencies["kokkos"].cxx,
            Some(PathBuf::from("/opt/kokkos/bin/nvcc_wrapper"))
        );
    }

    #[test]
    fn test_spec_toml_defaults() {
        let spec = Spec::from_toml_str("").unwrap();
        assert_eq!(spec, Spec::default());
        assert!(Spec::from_toml_str("compiler = \"@1\"").is_err());
    }

    #[test]
    fn test_spec_display() {
        let spec = Spec::new("21.03.0")
            .with_build_type(BuildType::Debug)
            .with("cuda", true)
            .with("zlib", false)
            .with("network", "gasnet");

        assert_eq!(
            spec.to_string(),
            "legion@21.03.0%gcc build_type=Debug +cuda network=gasnet ~zlib"
        );
    }
}
