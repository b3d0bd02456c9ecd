// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0
//! XCAL learning passes: sign of change, soft bounding, commit and schedules.

use proptest::prelude::*;
use synaptor_npu_neural::{Layer, Neuron};
use synaptor_npu_projection::{Full, OneToOne, Projection, ProjectionConfig, StructuralVariant};

fn trace(avg_s_lrn: f32, avg_m: f32) -> Neuron {
    Neuron {
        avg_s: avg_s_lrn,
        avg_s_lrn,
        avg_m,
        ..Neuron::default()
    }
}

fn layers(send: Vec<Neuron>, recv: Vec<Neuron>) -> (Layer, Layer) {
    let mut s = Layer::new("Input", send.len());
    s.neurons = send;
    let mut r = Layer::new("Hidden", recv.len());
    r.neurons = recv;
    (s, r)
}

fn variant_cfg(variant: StructuralVariant) -> ProjectionConfig {
    ProjectionConfig {
        variant,
        ..ProjectionConfig::default()
    }
}

#[test]
fn test_coactivity_potentiates_and_mismatch_depresses() {
    for variant in [StructuralVariant::AdaptiveSwt, StructuralVariant::FixedScale] {
        // receiver 0 more active in the outcome than the expectation, receiver 1 less
        let (s, r) = layers(vec![trace(0.8, 0.2)], vec![trace(0.8, 0.2), trace(0.1, 0.8)]);
        let mut pj = Projection::build(&s, &r, &Full::default(), variant_cfg(variant), 5).unwrap();
        let before_up = pj.synapse_value("Wt", 0, 0);
        let before_dn = pj.synapse_value("Wt", 0, 1);

        assert_eq!(pj.dwt(&s, &r).unwrap(), 2);
        assert!(pj.synapse_value("DWt", 0, 0) > 0.0);
        assert!(pj.synapse_value("DWt", 0, 1) < 0.0);
        pj.wt_fm_dwt();

        assert!(pj.synapse_value("Wt", 0, 0) > before_up, "{:?}", variant);
        assert!(pj.synapse_value("Wt", 0, 1) < before_dn, "{:?}", variant);
        assert_eq!(pj.synapse_value("DWt", 0, 0), 0.0);
    }
}

#[test]
fn test_dwt_accumulates_until_commit() {
    let (s, r) = layers(vec![trace(0.8, 0.2)], vec![trace(0.8, 0.2)]);
    let mut pj = Projection::build(&s, &r, &OneToOne, ProjectionConfig::default(), 5).unwrap();
    pj.dwt(&s, &r).unwrap();
    let once = pj.synapse_value("DWt", 0, 0);
    pj.dwt(&s, &r).unwrap();
    assert!((pj.synapse_value("DWt", 0, 0) - 2.0 * once).abs() < 1e-6);
}

#[test]
fn test_lrate_schedule_scales_changes() {
    let (s, r) = layers(vec![trace(0.8, 0.2)], vec![trace(0.8, 0.2)]);
    let mut full = Projection::build(&s, &r, &OneToOne, ProjectionConfig::default(), 5).unwrap();
    let mut half = full.clone();
    half.lrate_mult(0.5);
    full.dwt(&s, &r).unwrap();
    half.dwt(&s, &r).unwrap();
    let a = full.synapse_value("DWt", 0, 0);
    let b = half.synapse_value("DWt", 0, 0);
    assert!((b - 0.5 * a).abs() < 1e-7);
}

#[test]
fn test_sub_mean_centres_receiver() {
    let senders = vec![trace(0.9, 0.1), trace(0.5, 0.3), trace(0.2, 0.6), trace(0.6, 0.6)];
    let (s, r) = layers(senders, vec![trace(0.7, 0.3)]);
    let mut pj = Projection::build(&s, &r, &Full::default(), ProjectionConfig::default(), 5).unwrap();
    pj.dwt(&s, &r).unwrap();
    pj.dwt_sub_mean(&r).unwrap();
    let sum: f32 = (0..4).map(|si| pj.synapse_value("DWt", si, 0)).sum();
    assert!(sum.abs() < 1e-6);
}

#[test]
fn test_saturated_weights_stay_bounded_under_repeated_learning() {
    let (s, r) = layers(vec![trace(0.9, 0.1); 3], vec![trace(0.9, 0.1)]);
    let mut cfg = ProjectionConfig::default();
    cfg.learn.lrate = 1.0;
    cfg.learn.xcal.sub_mean = 0.0;
    let mut pj = Projection::build(&s, &r, &Full::default(), cfg, 5).unwrap();
    for _ in 0..200 {
        pj.dwt(&s, &r).unwrap();
        pj.wt_fm_dwt();
    }
    for sy in pj.syns() {
        assert!(sy.lwt <= 1.0 && sy.lwt > 0.9);
        assert!(sy.wt <= 2.0 * sy.swt + 1e-6);
    }
}

fn commit_once(variant: StructuralVariant, lwt: f32, dwt: f32) -> f32 {
    let s = Layer::new("Input", 1);
    let r = Layer::new("Hidden", 1);
    let mut pj = Projection::build(&s, &r, &OneToOne, variant_cfg(variant), 1).unwrap();
    pj.set_synapse_value("LWt", 0, 0, lwt).unwrap();
    pj.set_synapse_value("DWt", 0, 0, dwt).unwrap();
    pj.wt_fm_dwt();
    pj.synapse_value("LWt", 0, 0)
}

proptest! {
    #[test]
    fn prop_positive_change_never_exceeds_one(lwt in 0.0f32..=1.0, dwt in 0.0001f32..5.0) {
        for variant in [StructuralVariant::AdaptiveSwt, StructuralVariant::FixedScale] {
            let after = commit_once(variant, lwt, dwt);
            prop_assert!(after <= 1.0);
            prop_assert!(after >= lwt);
        }
    }

    #[test]
    fn prop_negative_change_never_below_zero(lwt in 0.0f32..=1.0, dwt in -5.0f32..-0.0001) {
        for variant in [StructuralVariant::AdaptiveSwt, StructuralVariant::FixedScale] {
            let after = commit_once(variant, lwt, dwt);
            prop_assert!(after >= 0.0);
            prop_assert!(after <= lwt);
        }
    }
}
