//! CMake cache entries and the Legion flag vocabulary.
//!
//! The names below are the contract with Legion's `CMakeLists.txt`; they
//! must match it byte for byte.

use std::fmt;

use serde::Serialize;

pub const LEGION_NETWORKS: &str = "Legion_NETWORKS";
pub const GASNET_ROOT_DIR: &str = "GASNet_ROOT_DIR";
pub const EMBED_GASNET: &str = "Legion_EMBED_GASNet";
pub const GASNET_CONDUIT: &str = "GASNet_CONDUIT";
pub const EMBED_GASNET_CONFIGURE_ARGS: &str = "Legion_EMBED_GASNet_CONFIGURE_ARGS";
pub const BUILD_SHARED_LIBS: &str = "BUILD_SHARED_LIBS";
pub const BOUNDS_CHECKS: &str = "Legion_BOUNDS_CHECKS";
pub const PRIVILEGE_CHECKS: &str = "Legion_PRIVILEGE_CHECKS";
pub const ENABLE_TLS: &str = "Legion_ENABLE_TLS";
pub const OUTPUT_LEVEL: &str = "Legion_OUTPUT_LEVEL";
pub const SPY: &str = "Legion_SPY";
pub const USE_CUDA: &str = "Legion_USE_CUDA";
pub const GPU_REDUCTIONS: &str = "Legion_GPU_REDUCTIONS";
pub const CUDA_ARCH: &str = "Legion_CUDA_ARCH";
pub const HIJACK_CUDART: &str = "Legion_HIJACK_CUDART";
pub const CUDA_NVCC_FLAGS: &str = "CUDA_NVCC_FLAGS";
pub const USE_FORTRAN: &str = "Legion_USE_Fortran";
pub const USE_HDF5: &str = "Legion_USE_HDF5";
pub const USE_HWLOC: &str = "Legion_USE_HWLOC";
pub const USE_KOKKOS: &str = "Legion_USE_Kokkos";
pub const USE_LIBDL: &str = "Legion_USE_LIBDL";
pub const USE_OPENMP: &str = "Legion_USE_OpenMP";
pub const USE_PAPI: &str = "Legion_USE_PAPI";
pub const USE_PYTHON: &str = "Legion_USE_Python";
pub const USE_ZLIB: &str = "Legion_USE_ZLIB";
pub const REDOP_COMPLEX: &str = "Legion_REDOP_COMPLEX";
pub const BUILD_BINDINGS: &str = "Legion_BUILD_BINDINGS";
pub const MAX_DIM: &str = "Legion_MAX_DIM";
pub const MAX_FIELDS: &str = "Legion_MAX_FIELDS";
pub const BUILD_MARCH: &str = "BUILD_MARCH";

/// Environment variable Legion's Kokkos support reads the compiler from.
pub const KOKKOS_CXX_COMPILER: &str = "KOKKOS_CXX_COMPILER";

/// Explicit cache type for `-DNAME:TYPE=VALUE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CacheType {
    String,
}

impl CacheType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheType::String => "STRING",
        }
    }
}

/// One `-D` argument for `cmake`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    pub name: &'static str,
    pub ty: Option<CacheType>,
    pub value: String,
}

impl CacheEntry {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        CacheEntry {
            name,
            ty: None,
            value: value.into(),
        }
    }

    /// `ON` / `OFF` switch.
    pub fn switch(name: &'static str, on: bool) -> Self {
        CacheEntry::new(name, if on { "ON" } else { "OFF" })
    }

    pub fn string(name: &'static str, value: impl Into<String>) -> Self {
        CacheEntry {
            ty: Some(CacheType::String),
            ..CacheEntry::new(name, value)
        }
    }

    /// Render as a command-line argument.
    pub fn to_arg(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Some(ty) => write!(f, "-D{}:{}={}", self.name, ty.as_str(), self.value),
            None => write!(f, "-D{}={}", self.name, self.value),
        }
    }
}
