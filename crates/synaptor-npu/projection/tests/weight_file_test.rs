// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0
//! Weight file round trips, partial loads and synapse variable access.

use synaptor_npu_neural::{Layer, PrjnError, WeightLoadIssue};
use synaptor_npu_projection::{
    ExplicitPattern, Full, PrjnWeights, Projection, ProjectionConfig, StructuralVariant, UniformRandom,
};

fn pair() -> (Layer, Layer) {
    (Layer::new("Input", 12), Layer::new("Hidden", 7))
}

fn assert_within_text_precision(a: &Projection, b: &Projection) {
    assert_eq!(a.syns().len(), b.syns().len());
    for (x, y) in a.syns().iter().zip(b.syns()) {
        assert!(
            (x.wt - y.wt).abs() <= x.wt.abs() * 5e-4 + 1e-7,
            "{} vs {}",
            x.wt,
            y.wt
        );
    }
}

#[test]
fn test_round_trip_both_variants() {
    for variant in [StructuralVariant::AdaptiveSwt, StructuralVariant::FixedScale] {
        let (s, r) = pair();
        let cfg = ProjectionConfig {
            variant,
            ..ProjectionConfig::default()
        };
        let pat = UniformRandom::new(0.5, 21);
        let mut orig = Projection::build(&s, &r, &pat, cfg, 1).unwrap();
        orig.init_gscale(0.15, 1.0);
        let text = orig.wts_json_string().unwrap();

        let mut fresh = Projection::build(&s, &r, &pat, cfg, 2).unwrap();
        fresh.read_wts_json(text.as_bytes()).unwrap();
        assert_within_text_precision(&orig, &fresh);
        assert_eq!(fresh.gscale.scale, orig.gscale.scale);
    }
}

#[test]
fn test_round_trip_through_file() {
    let (s, r) = pair();
    let orig = Projection::build(&s, &r, &Full::default(), ProjectionConfig::default(), 3).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input_to_hidden.wts.json");
    orig.save_wts(&path).unwrap();

    let mut fresh = Projection::build(&s, &r, &Full::default(), ProjectionConfig::default(), 4).unwrap();
    fresh.load_wts(&path).unwrap();
    assert_within_text_precision(&orig, &fresh);
}

#[test]
fn test_reader_accepts_reformatted_json() {
    let (s, r) = pair();
    let orig = Projection::build(&s, &r, &Full::default(), ProjectionConfig::default(), 3).unwrap();
    let pw = PrjnWeights::from_json_str(&orig.wts_json_string().unwrap()).unwrap();
    let compact = serde_json::to_string(&pw).unwrap();
    assert!(!compact.contains('\t'));

    let mut fresh = Projection::build(&s, &r, &Full::default(), ProjectionConfig::default(), 4).unwrap();
    fresh.read_wts_json(compact.as_bytes()).unwrap();
    assert_within_text_precision(&orig, &fresh);
}

#[test]
fn test_receiver_records_follow_receiver_view() {
    let (s, r) = pair();
    let pj = Projection::build(&s, &r, &UniformRandom::new(0.3, 8), ProjectionConfig::default(), 3).unwrap();
    let pw = pj.weights();
    assert_eq!(pw.from, "Input");
    assert_eq!(pw.rs.len(), 7);
    for (ri, rw) in pw.rs.iter().enumerate() {
        assert_eq!(rw.ri, ri);
        assert_eq!(rw.n, rw.si.len());
        assert_eq!(rw.n, rw.wt.len());
        assert!(rw.si.windows(2).all(|w| w[0] < w[1]));
        for (&si, &wt) in rw.si.iter().zip(&rw.wt) {
            assert_eq!(pj.synapse_value("Wt", si, ri), wt);
        }
    }
}

#[test]
fn test_partial_load_applies_the_rest() {
    let s = Layer::new("Input", 3);
    let r = Layer::new("Hidden", 2);
    let pat = ExplicitPattern::new(vec![(0, 0), (1, 0), (2, 1)]);
    let mut pj = Projection::build(&s, &r, &pat, ProjectionConfig::default(), 3).unwrap();
    let text = r#"{
        "From": "Input",
        "MetaData": { "GScale": "0.75" },
        "Rs": [
            { "Ri": 0, "N": 3, "Si": [ 0, 1, 2 ], "Wt": [ 0.11, 0.22, 0.33 ] },
            { "Ri": 1, "N": 2, "Si": [ 0, 2 ], "Wt": [ 0.44, 0.55 ] },
            { "Ri": 9, "N": 1, "Si": [ 0 ], "Wt": [ 0.66 ] }
        ]
    }"#;
    let err = pj.read_wts_json(text.as_bytes()).unwrap_err();
    let PrjnError::PartialApply(issues) = err else {
        panic!("expected a partial load");
    };
    assert_eq!(
        issues,
        vec![
            WeightLoadIssue::Unconnected { send: 2, recv: 0 },
            WeightLoadIssue::Unconnected { send: 0, recv: 1 },
            WeightLoadIssue::Unconnected { send: 0, recv: 9 },
        ]
    );
    assert_eq!(pj.gscale.scale, 0.75);
    assert_eq!(pj.synapse_value("Wt", 0, 0), 0.11);
    assert_eq!(pj.synapse_value("Wt", 1, 0), 0.22);
    assert_eq!(pj.synapse_value("Wt", 2, 1), 0.55);
}

#[test]
fn test_lookup_sentinels() {
    let s = Layer::new("Input", 3);
    let r = Layer::new("Hidden", 2);
    let pat = ExplicitPattern::new(vec![(0, 0), (2, 1)]);
    let mut pj = Projection::build(&s, &r, &pat, ProjectionConfig::default(), 3).unwrap();

    for var in pj.syn_var_names() {
        assert!(pj.synapse_value(var, 1, 0).is_nan());
        assert!(pj.synapse_value(var, 0, 5).is_nan());
        assert!(!pj.synapse_value(var, 0, 0).is_nan());
    }
    assert!(pj.synapse_value("Weight", 0, 0).is_nan());
    assert!(matches!(pj.syn_var_index("Weight"), Err(PrjnError::UnknownVariable(_))));

    let k = pj.syn_index(2, 1).unwrap();
    let wt_idx = pj.syn_var_index("Wt").unwrap();
    assert_eq!(pj.syn_val_1d(wt_idx, k), pj.synapse_value("Wt", 2, 1));

    let before = pj.syns().to_vec();
    assert!(pj.set_synapse_value("Wt", 1, 1, 0.5).is_err());
    assert_eq!(pj.syns(), &before[..]);
}

#[test]
fn test_bulk_values_are_sender_major() {
    let s = Layer::new("Input", 2);
    let r = Layer::new("Hidden", 2);
    let mut pj = Projection::build(&s, &r, &Full::default(), ProjectionConfig::default(), 3).unwrap();
    pj.set_wts_fn(|si, ri| 0.1 + 0.2 * si as f32 + 0.1 * ri as f32);
    let mut vals = Vec::new();
    pj.syn_vals("Wt", &mut vals).unwrap();
    let expected = [0.1f32, 0.2, 0.3, 0.4];
    for (v, e) in vals.iter().zip(expected) {
        assert!((v - e).abs() < 1e-6);
    }
    assert!(pj.syn_vals("Nope", &mut vals).is_err());
}
