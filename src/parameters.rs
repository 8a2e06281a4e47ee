// Copyright 2026 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Expansion of test specifications into concrete parameter tuples.
//!
//! Every generator walks cases in name order, then variants in declaration
//! order, then profiles in the order requested, so the produced list and the
//! test IDs derived from it are stable between runs.

use crate::spec::CbrVariant;
use crate::spec::CqpLpVariant;
use crate::spec::CqpVariant;
use crate::spec::EncodeVariants;
use crate::spec::TestSpec;
use crate::spec::VbrVariant;

/// Saturation levels exercised when a case does not list its own.
pub const DEFAULT_SATURATION_LEVELS: [u32; 4] = [0, 10, 50, 100];

/// Renders `name=value` pairs the way test IDs carry them.
pub fn format_fields(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaturationParams {
    pub case: String,
    pub level: u32,
}

impl SaturationParams {
    pub fn id_fields(&self) -> String {
        format_fields(&[("case", self.case.clone()), ("level", self.level.to_string())])
    }
}

pub fn gen_vpp_saturation_parameters(spec: &TestSpec) -> Vec<SaturationParams> {
    spec.iter()
        .flat_map(|(case, params)| {
            let levels = params
                .levels
                .clone()
                .unwrap_or_else(|| DEFAULT_SATURATION_LEVELS.to_vec());
            levels.into_iter().map(move |level| SaturationParams {
                case: case.clone(),
                level,
            })
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvcCqpParams {
    pub case: String,
    pub gop: u32,
    pub slices: u32,
    pub bframes: u32,
    pub qp: u32,
    pub quality: u32,
    pub profile: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvcCqpLpParams {
    pub case: String,
    pub gop: u32,
    pub slices: u32,
    pub qp: u32,
    pub quality: u32,
    pub profile: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvcCbrParams {
    pub case: String,
    pub gop: u32,
    pub slices: u32,
    pub bframes: u32,
    pub bitrate: u32,
    pub fps: u32,
    pub profile: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvcVbrParams {
    pub case: String,
    pub gop: u32,
    pub slices: u32,
    pub bframes: u32,
    pub bitrate: u32,
    pub fps: u32,
    pub quality: u32,
    pub refs: u32,
    pub profile: String,
}

impl AvcCqpParams {
    pub fn id_fields(&self) -> String {
        format_fields(&[
            ("case", self.case.clone()),
            ("gop", self.gop.to_string()),
            ("slices", self.slices.to_string()),
            ("bframes", self.bframes.to_string()),
            ("qp", self.qp.to_string()),
            ("quality", self.quality.to_string()),
            ("profile", self.profile.clone()),
        ])
    }
}

impl AvcCqpLpParams {
    pub fn id_fields(&self) -> String {
        format_fields(&[
            ("case", self.case.clone()),
            ("gop", self.gop.to_string()),
            ("slices", self.slices.to_string()),
            ("qp", self.qp.to_string()),
            ("quality", self.quality.to_string()),
            ("profile", self.profile.clone()),
        ])
    }
}

impl AvcCbrParams {
    pub fn id_fields(&self) -> String {
        format_fields(&[
            ("case", self.case.clone()),
            ("gop", self.gop.to_string()),
            ("slices", self.slices.to_string()),
            ("bframes", self.bframes.to_string()),
            ("bitrate", self.bitrate.to_string()),
            ("fps", self.fps.to_string()),
            ("profile", self.profile.clone()),
        ])
    }
}

impl AvcVbrParams {
    pub fn id_fields(&self) -> String {
        format_fields(&[
            ("case", self.case.clone()),
            ("gop", self.gop.to_string()),
            ("slices", self.slices.to_string()),
            ("bframes", self.bframes.to_string()),
            ("bitrate", self.bitrate.to_string()),
            ("fps", self.fps.to_string()),
            ("quality", self.quality.to_string()),
            ("refs", self.refs.to_string()),
            ("profile", self.profile.clone()),
        ])
    }
}

fn default_cqp_variants() -> Vec<CqpVariant> {
    [(1, 1, 0, 14, 4), (30, 4, 2, 28, 1), (30, 4, 2, 28, 7), (1, 2, 0, 51, 4)]
        .into_iter()
        .map(|(gop, slices, bframes, qp, quality)| CqpVariant {
            gop,
            slices,
            bframes,
            qp,
            quality,
            profile: None,
        })
        .collect()
}

fn default_cqp_lp_variants() -> Vec<CqpLpVariant> {
    [(1, 1, 14, 4), (30, 4, 28, 1), (30, 4, 28, 7), (1, 2, 51, 4)]
        .into_iter()
        .map(|(gop, slices, qp, quality)| CqpLpVariant {
            gop,
            slices,
            qp,
            quality,
            profile: None,
        })
        .collect()
}

fn default_cbr_variants() -> Vec<CbrVariant> {
    [(1, 1, 0, 2000, 30), (30, 4, 2, 4000, 30), (30, 2, 0, 6000, 60)]
        .into_iter()
        .map(|(gop, slices, bframes, bitrate, fps)| CbrVariant {
            gop,
            slices,
            bframes,
            bitrate,
            fps,
            profile: None,
        })
        .collect()
}

fn default_vbr_variants() -> Vec<VbrVariant> {
    [
        (1, 1, 0, 2000, 30, 4, 1),
        (30, 4, 2, 4000, 30, 1, 2),
        (30, 2, 0, 6000, 60, 7, 1),
    ]
    .into_iter()
    .map(|(gop, slices, bframes, bitrate, fps, quality, refs)| VbrVariant {
        gop,
        slices,
        bframes,
        bitrate,
        fps,
        quality,
        refs,
        profile: None,
    })
    .collect()
}

// Crosses every (case, variant) with the profiles it applies to. A variant
// naming its own profile only runs with that profile.
fn expand<V: Clone, P>(
    spec: &TestSpec,
    profiles: &[&str],
    select: impl Fn(&EncodeVariants) -> Option<&Vec<V>>,
    defaults: impl Fn() -> Vec<V>,
    profile_of: impl Fn(&V) -> Option<&String>,
    make: impl Fn(&str, &V, String) -> P,
) -> Vec<P> {
    let mut out = Vec::new();
    for (case, params) in spec {
        let variants = match select(&params.variants) {
            Some(variants) => variants.clone(),
            None => defaults(),
        };
        for variant in &variants {
            let chosen: Vec<String> = match profile_of(variant) {
                Some(profile) => vec![profile.clone()],
                None => profiles.iter().map(|p| p.to_string()).collect(),
            };
            for profile in chosen {
                out.push(make(case, variant, profile));
            }
        }
    }
    out
}

pub fn gen_avc_cqp_parameters(spec: &TestSpec, profiles: &[&str]) -> Vec<AvcCqpParams> {
    expand(
        spec,
        profiles,
        |v| v.cqp.as_ref(),
        default_cqp_variants,
        |v| v.profile.as_ref(),
        |case, v, profile| AvcCqpParams {
            case: case.to_string(),
            gop: v.gop,
            slices: v.slices,
            bframes: v.bframes,
            qp: v.qp,
            quality: v.quality,
            profile,
        },
    )
}

pub fn gen_avc_cqp_lp_parameters(spec: &TestSpec, profiles: &[&str]) -> Vec<AvcCqpLpParams> {
    expand(
        spec,
        profiles,
        |v| v.cqp_lp.as_ref(),
        default_cqp_lp_variants,
        |v| v.profile.as_ref(),
        |case, v, profile| AvcCqpLpParams {
            case: case.to_string(),
            gop: v.gop,
            slices: v.slices,
            qp: v.qp,
            quality: v.quality,
            profile,
        },
    )
}

pub fn gen_avc_cbr_parameters(spec: &TestSpec, profiles: &[&str]) -> Vec<AvcCbrParams> {
    expand(
        spec,
        profiles,
        |v| v.cbr.as_ref(),
        default_cbr_variants,
        |v| v.profile.as_ref(),
        |case, v, profile| AvcCbrParams {
            case: case.to_string(),
            gop: v.gop,
            slices: v.slices,
            bframes: v.bframes,
            bitrate: v.bitrate,
            fps: v.fps,
            profile,
        },
    )
}

pub fn gen_avc_vbr_parameters(spec: &TestSpec, profiles: &[&str]) -> Vec<AvcVbrParams> {
    expand(
        spec,
        profiles,
        |v| v.vbr.as_ref(),
        default_vbr_variants,
        |v| v.profile.as_ref(),
        |case, v, profile| AvcVbrParams {
            case: case.to_string(),
            gop: v.gop,
            slices: v.slices,
            bframes: v.bframes,
            bitrate: v.bitrate,
            fps: v.fps,
            quality: v.quality,
            refs: v.refs,
            profile,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::spec::CaseSpec;

    fn case(levels: Option<Vec<u32>>) -> CaseSpec {
        CaseSpec {
            source: PathBuf::from("/media/a.yuv"),
            width: 176,
            height: 144,
            format: "I420".to_string(),
            frames: 10,
            fps: None,
            levels,
            r2r: None,
            refctx: Vec::new(),
            variants: EncodeVariants::default(),
        }
    }

    #[test]
    fn saturation_crosses_cases_and_levels() {
        let mut spec = TestSpec::new();
        spec.insert("b".to_string(), case(Some(vec![80])));
        spec.insert("a".to_string(), case(None));

        let params = gen_vpp_saturation_parameters(&spec);
        let ids: Vec<String> = params.iter().map(|p| p.id_fields()).collect();
        assert_eq!(
            ids,
            vec![
                "case=a,level=0",
                "case=a,level=10",
                "case=a,level=50",
                "case=a,level=100",
                "case=b,level=80",
            ]
        );
    }

    #[test]
    fn cqp_defaults_cross_profiles() {
        let mut spec = TestSpec::new();
        spec.insert("a".to_string(), case(None));

        let params = gen_avc_cqp_parameters(&spec, &["main", "high"]);
        assert_eq!(params.len(), default_cqp_variants().len() * 2);
        assert_eq!(params[0].profile, "main");
        assert_eq!(params[1].profile, "high");
        assert_eq!(params[0].gop, params[1].gop);
    }

    #[test]
    fn variant_profile_overrides_requested_profiles() {
        let mut spec = TestSpec::new();
        let mut a = case(None);
        a.variants.cqp = Some(vec![CqpVariant {
            gop: 30,
            slices: 1,
            bframes: 2,
            qp: 26,
            quality: 4,
            profile: Some("main".to_string()),
        }]);
        spec.insert("a".to_string(), a);

        let params = gen_avc_cqp_parameters(&spec, &["main", "high"]);
        assert_eq!(
            params,
            vec![AvcCqpParams {
                case: "a".to_string(),
                gop: 30,
                slices: 1,
                bframes: 2,
                qp: 26,
                quality: 4,
                profile: "main".to_string(),
            }]
        );
        assert_eq!(
            params[0].id_fields(),
            "case=a,gop=30,slices=1,bframes=2,qp=26,quality=4,profile=main"
        );
    }

    #[test]
    fn generation_is_stable() {
        let mut spec = TestSpec::new();
        spec.insert("x".to_string(), case(None));
        spec.insert("y".to_string(), case(None));
        assert_eq!(
            gen_avc_vbr_parameters(&spec, &["high", "main"]),
            gen_avc_vbr_parameters(&spec, &["high", "main"])
        );
        assert_eq!(gen_avc_cbr_parameters(&spec, &["main"]).len(), 6);
        assert_eq!(gen_avc_cqp_lp_parameters(&spec, &["main"]).len(), 8);
    }
}
