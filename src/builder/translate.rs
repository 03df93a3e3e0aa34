//! Spec to CMake argument translation.
//!
//! Translation runs in two phases. The gate validates every variant value,
//! then checks the conflict rules; nothing is emitted unless both pass.
//! Synthesis then walks a fixed sequence of decision blocks, so identical
//! specs always produce identical argument lists.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::builder::cmake::{self, CacheEntry};
use crate::core::constraint::ConstraintSet;
use crate::core::dependency::{DependencyDescriptor, DependencyTable};
use crate::core::errors::{TranslateError, ValidationError};
use crate::core::spec::{BuildType, ResolvedSpec, Spec};
use crate::core::variant::{VariantSchema, NONE};

/// Field limit used when the requested one is not positive.
pub const DEFAULT_MAX_FIELDS: u64 = 512;

/// Extra C++ flags for `build_type=Debug`.
pub const DEBUG_CXX_FLAGS: &[&str] = &["-DDEBUG_REALM", "-DDEBUG_LEGION", "-ggdb"];

/// Round `requested` up to a power of two.
///
/// Non-positive requests fall back to [`DEFAULT_MAX_FIELDS`]. A value that
/// is not already a power of two becomes the next larger one: clear the
/// lowest set bit until a single bit is left, then shift it up once.
pub fn normalize_max_fields(requested: i64) -> u64 {
    if requested <= 0 {
        return DEFAULT_MAX_FIELDS;
    }

    let mut fields = requested as u64;
    if fields & (fields - 1) != 0 {
        while fields & (fields - 1) != 0 {
            fields &= fields - 1;
        }
        fields <<= 1;
    }
    fields
}

/// Where GASNet comes from when it is the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GasnetSource {
    /// Built from source as part of Legion.
    Embedded,
    /// A pre-installed GASNet prefix.
    External(PathBuf),
}

/// The transport selection after conflict checking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Transport {
    Gasnet {
        source: GasnetSource,
        conduit: String,
        debug: bool,
    },
    Mpi,
    None,
}

/// Values computed from the spec rather than copied from it.
///
/// Recomputed on every translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivedValues {
    pub transport: Transport,
    pub output_level: String,
    /// `redop_complex`, widened by `bindings`.
    pub redop_complex: bool,
    /// `fortran`, widened by `bindings`.
    pub fortran: bool,
    pub max_dims: i64,
    pub max_fields: u64,
    /// Compiler path exposed by the Kokkos dependency, when Kokkos is on.
    pub kokkos_cxx: Option<PathBuf>,
}

impl DerivedValues {
    /// Compute derived values. Expects the conflict rules to have passed.
    pub fn compute(resolved: &ResolvedSpec<'_>) -> Result<Self, ValidationError> {
        let variants = &resolved.variants;
        let text = |name: &str| variants.text(name).unwrap_or(NONE).to_string();

        let transport = match text("network").as_str() {
            "gasnet" => {
                let root = text("gasnet_root");
                let source = if root == NONE {
                    GasnetSource::Embedded
                } else {
                    GasnetSource::External(PathBuf::from(root))
                };
                Transport::Gasnet {
                    source,
                    conduit: text("conduit"),
                    debug: variants.enabled("gasnet_debug"),
                }
            }
            "mpi" => Transport::Mpi,
            _ => Transport::None,
        };

        let bindings = variants.enabled("bindings");

        let kokkos_cxx = if variants.enabled("kokkos") {
            let cxx = resolved
                .spec
                .dependencies
                .get("kokkos")
                .and_then(|dep| dep.cxx.clone())
                .ok_or_else(|| ValidationError::UnresolvedDependency {
                    variant: "kokkos".to_string(),
                    value: "true".to_string(),
                    dependency: "kokkos".to_string(),
                    missing: "a C++ compiler path (`cxx`)".to_string(),
                })?;
            Some(cxx)
        } else {
            None
        };

        Ok(DerivedValues {
            transport,
            output_level: text("output_level").to_uppercase(),
            redop_complex: variants.enabled("redop_complex") || bindings,
            fortran: variants.enabled("fortran") || bindings,
            max_dims: variants.integer("max_dims").unwrap_or(3),
            max_fields: normalize_max_fields(
                variants.integer("max_fields").unwrap_or(DEFAULT_MAX_FIELDS as i64),
            ),
            kokkos_cxx,
        })
    }
}

/// The outcome of a successful translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    /// Arguments for `cmake`, in emission order.
    pub flags: Vec<String>,
    /// Extra C++ flags for debug builds.
    ///
    /// Computed but not part of `flags`; whether they should be forwarded
    /// to the build is still undecided.
    pub cxx_flags: Vec<String>,
    /// Environment the caller must set before configuring.
    pub env: BTreeMap<String, String>,
    /// Dependencies this configuration needs.
    pub dependencies: Vec<DependencyDescriptor>,
    pub derived: DerivedValues,
}

/// Turns specs into CMake arguments.
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    schema: &'a VariantSchema,
    constraints: &'a ConstraintSet,
    dependencies: Option<&'a DependencyTable>,
    versions: Option<&'a [&'static str]>,
}

impl<'a> Translator<'a> {
    pub fn new(schema: &'a VariantSchema, constraints: &'a ConstraintSet) -> Self {
        Translator {
            schema,
            constraints,
            dependencies: None,
            versions: None,
        }
    }

    /// Report active rows of `table` with each translation.
    pub fn with_dependencies(mut self, table: &'a DependencyTable) -> Self {
        self.dependencies = Some(table);
        self
    }

    /// Reject spec versions not in `versions`.
    pub fn with_versions(mut self, versions: &'a [&'static str]) -> Self {
        self.versions = Some(versions);
        self
    }

    /// Validate and resolve without emitting anything.
    ///
    /// Custom validators (the `gasnet_root` directory check) run only after
    /// the conflict rules pass.
    pub fn check<'s>(&self, spec: &'s Spec) -> Result<ResolvedSpec<'s>, TranslateError> {
        self.check_version(spec)?;
        let resolved = ResolvedSpec {
            spec,
            variants: self.schema.resolve_deferred(&spec.variants)?,
        };
        self.constraints.check_all(&resolved)?;
        self.schema.run_validators(&resolved.variants)?;
        Ok(resolved)
    }

    pub fn translate(&self, spec: &Spec) -> Result<Translation, TranslateError> {
        let resolved = self.check(spec)?;
        let derived = DerivedValues::compute(&resolved)?;

        let mut flags = Vec::new();
        let mut cxx_flags = Vec::new();
        let mut env = BTreeMap::new();

        emit_transport(&derived.transport, &mut flags);

        let on = |name: &str| resolved.enabled(name);

        flags.push(CacheEntry::switch(cmake::BUILD_SHARED_LIBS, on("shared")));
        flags.push(CacheEntry::switch(cmake::BOUNDS_CHECKS, on("bounds_checks")));
        flags.push(CacheEntry::switch(
            cmake::PRIVILEGE_CHECKS,
            on("privilege_checks"),
        ));
        flags.push(CacheEntry::switch(cmake::ENABLE_TLS, on("enable_tls")));
        flags.push(CacheEntry::new(
            cmake::OUTPUT_LEVEL,
            derived.output_level.clone(),
        ));
        flags.push(CacheEntry::switch(cmake::SPY, on("spy")));

        if on("cuda") {
            let arch = resolved.variants.text("cuda_arch").unwrap_or_default();
            tracing::debug!(arch, hijack = on("cuda_hijack"), "cuda enabled");

            flags.push(CacheEntry::switch(cmake::USE_CUDA, true));
            flags.push(CacheEntry::switch(cmake::GPU_REDUCTIONS, true));
            flags.push(CacheEntry::new(cmake::CUDA_ARCH, arch));
            flags.push(CacheEntry::switch(cmake::HIJACK_CUDART, on("cuda_hijack")));

            if on("cuda_unsupported_compiler") {
                flags.push(CacheEntry::string(
                    cmake::CUDA_NVCC_FLAGS,
                    "--allow-unsupported-compiler",
                ));
            }
        }

        flags.push(CacheEntry::switch(cmake::USE_FORTRAN, derived.fortran));
        flags.push(CacheEntry::switch(cmake::USE_HDF5, on("hdf5")));
        flags.push(CacheEntry::switch(cmake::USE_HWLOC, on("hwloc")));

        if let Some(cxx) = &derived.kokkos_cxx {
            tracing::debug!(cxx = %cxx.display(), "kokkos enabled");
            flags.push(CacheEntry::switch(cmake::USE_KOKKOS, true));
            env.insert(
                cmake::KOKKOS_CXX_COMPILER.to_string(),
                cxx.display().to_string(),
            );
        }

        flags.push(CacheEntry::switch(cmake::USE_LIBDL, on("libdl")));
        flags.push(CacheEntry::switch(cmake::USE_OPENMP, on("openmp")));
        flags.push(CacheEntry::switch(cmake::USE_PAPI, on("papi")));
        flags.push(CacheEntry::switch(cmake::USE_PYTHON, on("python")));
        flags.push(CacheEntry::switch(cmake::USE_ZLIB, on("zlib")));
        flags.push(CacheEntry::switch(
            cmake::REDOP_COMPLEX,
            derived.redop_complex,
        ));

        if on("bindings") {
            tracing::debug!("bindings force complex reductions and Fortran on");
            flags.push(CacheEntry::switch(cmake::BUILD_BINDINGS, true));
        }

        if spec.build_type == BuildType::Debug {
            cxx_flags.extend(DEBUG_CXX_FLAGS.iter().map(|f| f.to_string()));
        }

        flags.push(CacheEntry::new(cmake::MAX_DIM, derived.max_dims.to_string()));
        flags.push(CacheEntry::new(
            cmake::MAX_FIELDS,
            derived.max_fields.to_string(),
        ));

        // Without +native, BUILD_MARCH is left to Legion's own default.
        if on("native") {
            flags.push(CacheEntry::string(cmake::BUILD_MARCH, "native"));
        }

        let dependencies = self
            .dependencies
            .map(|table| table.active(&resolved).into_iter().cloned().collect())
            .unwrap_or_default();

        let flags: Vec<String> = flags.iter().map(CacheEntry::to_arg).collect();

        tracing::info!(
            spec = %spec,
            flags = flags.len(),
            "translated build configuration"
        );

        Ok(Translation {
            flags,
            cxx_flags,
            env,
            dependencies,
            derived,
        })
    }

    fn check_version(&self, spec: &Spec) -> Result<(), ValidationError> {
        let Some(versions) = self.versions else {
            return Ok(());
        };

        if versions.contains(&spec.version.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::InvalidDomain {
                variant: "version".to_string(),
                value: spec.version.clone(),
                allowed: versions.iter().map(|v| v.to_string()).collect(),
            })
        }
    }
}

fn emit_transport(transport: &Transport, flags: &mut Vec<CacheEntry>) {
    match transport {
        Transport::Gasnet {
            source,
            conduit,
            debug,
        } => {
            tracing::debug!(?source, conduit = conduit.as_str(), "gasnet transport");
            flags.push(CacheEntry::new(cmake::LEGION_NETWORKS, "gasnetex"));
            match source {
                GasnetSource::External(root) => {
                    flags.push(CacheEntry::new(
                        cmake::GASNET_ROOT_DIR,
                        root.display().to_string(),
                    ));
                }
                GasnetSource::Embedded => {
                    flags.push(CacheEntry::switch(cmake::EMBED_GASNET, true));
                }
            }
            flags.push(CacheEntry::new(cmake::GASNET_CONDUIT, conduit.clone()));
            if *debug {
                flags.push(CacheEntry::new(
                    cmake::EMBED_GASNET_CONFIGURE_ARGS,
                    "--enable-debug",
                ));
            }
        }
        Transport::Mpi => {
            tracing::debug!("mpi transport");
            flags.push(CacheEntry::new(cmake::LEGION_NETWORKS, "mpi"));
        }
        Transport::None => {
            tracing::debug!("no network transport");
            flags.push(CacheEntry::switch(cmake::EMBED_GASNET, false));
        }
    }
}
