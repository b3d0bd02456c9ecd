// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */
//! Receiver-centric weight files
//!
//! One projection's weights as JSON text. The writer emits the layout
//! byte for byte (tab indentation, `Si`/`Wt` rows on one line, no newline
//! after the closing brace so an enclosing writer can append `,` or `\n`);
//! the reader accepts any JSON with the same shape.
//!
//! ```text
//! {
//! 	"From": "Input",
//! 	"MetaData": {
//! 		"GScale": "0.25"
//! 	},
//! 	"Rs": [
//! 		{
//! 			"Ri": 0,
//! 			"N": 2,
//! 			"Si": [ 0, 1 ],
//! 			"Wt": [ 0.4873, 0.5121 ]
//! 		}
//! 	]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use synaptor_npu_neural::{PrjnError, Result, WeightLoadIssue};

use crate::projection::Projection;

/// Significant digits written for each weight
pub const WEIGHT_PREC: usize = 4;

/// Metadata key holding the projection's conductance scale
pub const GSCALE_KEY: &str = "GScale";

/// One projection's weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrjnWeights {
    /// Sending layer name
    #[serde(rename = "From")]
    pub from: String,
    #[serde(rename = "MetaData", default)]
    pub meta_data: BTreeMap<String, String>,
    #[serde(rename = "Rs", default)]
    pub rs: Vec<RecvWeights>,
}

/// Incoming weights of one receiving unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecvWeights {
    #[serde(rename = "Ri")]
    pub ri: usize,
    #[serde(rename = "N")]
    pub n: usize,
    #[serde(rename = "Si", default)]
    pub si: Vec<usize>,
    #[serde(rename = "Wt", default)]
    pub wt: Vec<f32>,
}

impl PrjnWeights {
    /// Parse one projection's weights
    pub fn from_reader<R: Read>(r: R) -> Result<Self> {
        serde_json::from_reader(r).map_err(|e| PrjnError::WeightFormat(e.to_string()))
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|e| PrjnError::WeightFormat(e.to_string()))
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn exp_form(mant: &str, exp: i32) -> String {
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", trim_fraction(mant), sign, exp.abs())
}

fn special(v: f64) -> Option<String> {
    if v.is_nan() {
        Some("NaN".to_string())
    } else if v.is_infinite() {
        Some(if v > 0.0 { "+Inf" } else { "-Inf" }.to_string())
    } else if v == 0.0 {
        Some(if v.is_sign_negative() { "-0" } else { "0" }.to_string())
    } else {
        None
    }
}

/// Format with `prec` significant digits in `%g` style
///
/// Exponent notation is used when the decimal exponent is below -4 or at
/// least `prec`; trailing zeros are dropped.
///
/// ```
/// use synaptor_npu_projection::format_g;
///
/// assert_eq!(format_g(0.5, 4), "0.5");
/// assert_eq!(format_g(0.123456, 4), "0.1235");
/// assert_eq!(format_g(0.00001234, 4), "1.234e-05");
/// assert_eq!(format_g(12346.0, 4), "1.235e+04");
/// ```
pub fn format_g(v: f32, prec: usize) -> String {
    let v = f64::from(v);
    if let Some(s) = special(v) {
        return s;
    }
    let prec = prec.max(1);
    let sci = format!("{:.*e}", prec - 1, v);
    let Some((mant, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= prec as i32 {
        exp_form(mant, exp)
    } else {
        let decimals = (prec as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, v)).to_string()
    }
}

/// Shortest round-trip `%g` formatting of an `f32`
fn format_g_shortest(v: f32) -> String {
    if let Some(s) = special(f64::from(v)) {
        return s;
    }
    let sci = format!("{:e}", v);
    let Some((mant, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if !(-4..6).contains(&exp) {
        exp_form(mant, exp)
    } else {
        format!("{}", v)
    }
}

fn tabs<W: Write>(w: &mut W, depth: usize) -> std::io::Result<()> {
    for _ in 0..depth {
        w.write_all(b"\t")?;
    }
    Ok(())
}

fn write_row<W, I, F>(w: &mut W, vals: I, fmt: F) -> std::io::Result<()>
where
    W: Write,
    I: ExactSizeIterator,
    F: Fn(I::Item) -> String,
{
    let n = vals.len();
    w.write_all(b"[ ")?;
    for (i, v) in vals.enumerate() {
        w.write_all(fmt(v).as_bytes())?;
        let sep: &[u8] = if i + 1 == n { b" " } else { b", " };
        w.write_all(sep)?;
    }
    w.write_all(b"]")
}

impl Projection {
    /// Snapshot of the weights in file form
    pub fn weights(&self) -> PrjnWeights {
        let cons = self.cons();
        let syns = self.syns();
        let rs = (0..cons.recv_n())
            .map(|ri| RecvWeights {
                ri,
                n: cons.r_con_n()[ri] as usize,
                si: cons.recv_send_idxs(ri).iter().map(|&s| s as usize).collect(),
                wt: cons.recv_syn_idxs(ri).iter().map(|&k| syns[k as usize].wt).collect(),
            })
            .collect();
        let mut meta_data = BTreeMap::new();
        meta_data.insert(GSCALE_KEY.to_string(), format_g_shortest(self.gscale.scale));
        PrjnWeights {
            from: self.send_name().to_string(),
            meta_data,
            rs,
        }
    }

    /// Write this projection's weights starting at indentation `depth`
    ///
    /// Rows are streamed from the receiver view. The closing brace is not
    /// followed by a newline.
    pub fn write_wts_json<W: Write>(&self, w: &mut W, depth: usize) -> Result<()> {
        let cons = self.cons();
        let syns = self.syns();
        let from =
            serde_json::to_string(self.send_name()).map_err(|e| PrjnError::WeightFormat(e.to_string()))?;
        let gscale = format_g_shortest(self.gscale.scale);

        tabs(w, depth)?;
        w.write_all(b"{\n")?;
        tabs(w, depth + 1)?;
        writeln!(w, "\"From\": {},", from)?;
        tabs(w, depth + 1)?;
        w.write_all(b"\"MetaData\": {\n")?;
        tabs(w, depth + 2)?;
        writeln!(w, "\"{}\": \"{}\"", GSCALE_KEY, gscale)?;
        tabs(w, depth + 1)?;
        w.write_all(b"},\n")?;
        tabs(w, depth + 1)?;
        w.write_all(b"\"Rs\": [\n")?;

        let nr = cons.recv_n();
        for ri in 0..nr {
            let d = depth + 2;
            tabs(w, d)?;
            w.write_all(b"{\n")?;
            tabs(w, d + 1)?;
            writeln!(w, "\"Ri\": {},", ri)?;
            tabs(w, d + 1)?;
            writeln!(w, "\"N\": {},", cons.r_con_n()[ri])?;
            tabs(w, d + 1)?;
            w.write_all(b"\"Si\": ")?;
            write_row(w, cons.recv_send_idxs(ri).iter(), |si| si.to_string())?;
            w.write_all(b",\n")?;
            tabs(w, d + 1)?;
            w.write_all(b"\"Wt\": ")?;
            write_row(w, cons.recv_syn_idxs(ri).iter(), |&k| {
                format_g(syns[k as usize].wt, WEIGHT_PREC)
            })?;
            w.write_all(b"\n")?;
            tabs(w, d)?;
            let close: &[u8] = if ri + 1 == nr { b"}\n" } else { b"},\n" };
            w.write_all(close)?;
        }

        tabs(w, depth + 1)?;
        w.write_all(b"]\n")?;
        tabs(w, depth)?;
        w.write_all(b"}")?;
        Ok(())
    }

    /// Weights as a JSON string
    pub fn wts_json_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_wts_json(&mut buf, 0)?;
        String::from_utf8(buf).map_err(|e| PrjnError::WeightFormat(e.to_string()))
    }

    /// Read and apply weights written for this projection
    pub fn read_wts_json<R: Read>(&mut self, r: R) -> Result<()> {
        let pw = PrjnWeights::from_reader(r)?;
        self.set_wts(&pw)
    }

    /// Apply decoded weights
    ///
    /// Every entry is attempted. Entries naming units that are not
    /// connected, records whose `Si`/`Wt` lengths disagree and unparsable
    /// metadata are collected and returned together as
    /// [`PrjnError::PartialApply`] after the pass; everything else stays
    /// applied.
    pub fn set_wts(&mut self, pw: &PrjnWeights) -> Result<()> {
        if pw.from != self.send_name() {
            warn!(
                target: "synaptor_npu_projection",
                "{}: weights were saved from {:?}", self.name(), pw.from
            );
        }
        let mut issues = Vec::new();

        if let Some(gs) = pw.meta_data.get(GSCALE_KEY) {
            match gs.trim().parse::<f32>() {
                Ok(v) => self.gscale.scale = v,
                Err(_) => issues.push(WeightLoadIssue::BadMetaData {
                    key: GSCALE_KEY.to_string(),
                    value: gs.clone(),
                }),
            }
        }

        let mut applied = 0usize;
        for rw in &pw.rs {
            if rw.si.len() != rw.wt.len() {
                issues.push(WeightLoadIssue::LengthMismatch {
                    recv: rw.ri,
                    si: rw.si.len(),
                    wt: rw.wt.len(),
                });
                continue;
            }
            for (&si, &wt) in rw.si.iter().zip(&rw.wt) {
                match self.set_synapse_value("Wt", si, rw.ri, wt) {
                    Ok(()) => applied += 1,
                    Err(PrjnError::NotConnected { send, recv }) => {
                        issues.push(WeightLoadIssue::Unconnected { send, recv })
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        if issues.is_empty() {
            info!(
                target: "synaptor_npu_projection",
                "{}: loaded {} weights", self.name(), applied
            );
            Ok(())
        } else {
            warn!(
                target: "synaptor_npu_projection",
                "{}: loaded {} weights, {} entries rejected", self.name(), applied, issues.len()
            );
            Err(PrjnError::PartialApply(issues))
        }
    }

    /// Write weights to a file
    pub fn save_wts<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut w = BufWriter::new(File::create(path)?);
        self.write_wts_json(&mut w, 0)?;
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }

    /// Read weights from a file
    pub fn load_wts<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.read_wts_json(BufReader::new(File::open(path)?))
    }
}
