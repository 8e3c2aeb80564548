//! Capability providers backed by the running host and build.

use std::env::consts::{ARCH, OS};
use std::thread;

use crate::capability::CapabilityProviders;

/// Extensions reported in `cpu_features` when the binary was compiled with
/// them enabled.
const COMPILED_FEATURES: &[(&str, bool)] = &[
    ("sse3", cfg!(target_feature = "sse3")),
    ("ssse3", cfg!(target_feature = "ssse3")),
    ("avx", cfg!(target_feature = "avx")),
    ("avx2", cfg!(target_feature = "avx2")),
    ("f16c", cfg!(target_feature = "f16c")),
    ("fma", cfg!(target_feature = "fma")),
    ("avx512f", cfg!(target_feature = "avx512f")),
    ("avx512vnni", cfg!(target_feature = "avx512vnni")),
    ("neon", cfg!(target_feature = "neon")),
    ("dotprod", cfg!(target_feature = "dotprod")),
    ("i8mm", cfg!(target_feature = "i8mm")),
    ("sve", cfg!(target_feature = "sve")),
];

/// Production providers for [`crate::CapabilityReporter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProviders;

impl CapabilityProviders for HostProviders {
    fn system_info(&self) -> String {
        let threads = thread::available_parallelism().map_or(1, usize::from);
        let flags = runtime_features()
            .iter()
            .map(|(name, present)| format!("{name} = {}", u8::from(*present)))
            .collect::<Vec<_>>()
            .join(" | ");
        format!("{OS}/{ARCH} | threads = {threads} | CPU : {flags}")
    }

    fn build_version(&self) -> String {
        option_env!("LUMEN_BUILD_VERSION")
            .filter(|version| !version.is_empty())
            .unwrap_or(env!("CARGO_PKG_VERSION"))
            .to_owned()
    }

    fn cpu_features(&self) -> String {
        compiled_features().join(",")
    }
}

fn compiled_features() -> Vec<&'static str> {
    COMPILED_FEATURES
        .iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| *name)
        .collect()
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn runtime_features() -> Vec<(&'static str, bool)> {
    vec![
        ("SSE3", std::arch::is_x86_feature_detected!("sse3")),
        ("SSSE3", std::arch::is_x86_feature_detected!("ssse3")),
        ("AVX", std::arch::is_x86_feature_detected!("avx")),
        ("AVX2", std::arch::is_x86_feature_detected!("avx2")),
        ("F16C", std::arch::is_x86_feature_detected!("f16c")),
        ("FMA", std::arch::is_x86_feature_detected!("fma")),
        ("AVX512", std::arch::is_x86_feature_detected!("avx512f")),
        ("AVX512_VNNI", std::arch::is_x86_feature_detected!("avx512vnni")),
    ]
}

#[cfg(target_arch = "aarch64")]
fn runtime_features() -> Vec<(&'static str, bool)> {
    vec![
        ("NEON", std::arch::is_aarch64_feature_detected!("neon")),
        ("DOTPROD", std::arch::is_aarch64_feature_detected!("dotprod")),
        ("MATMUL_INT8", std::arch::is_aarch64_feature_detected!("i8mm")),
        ("FP16_VA", std::arch::is_aarch64_feature_detected!("fp16")),
        ("SVE", std::arch::is_aarch64_feature_detected!("sve")),
    ]
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
fn runtime_features() -> Vec<(&'static str, bool)> {
    Vec::new()
}
