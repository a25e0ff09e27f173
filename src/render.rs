//! Plain-text rendering of the form, predictions and errors.

use std::fmt::Write;

use crate::collector::{CONTROLS, Control};
use crate::error::{CycleError, EncodingError, PredictionError};
use crate::predictor::{Confidence, Prediction, RankedImportance};
use crate::record::CustomerRecord;
use crate::sample::SampleTable;

/// Control panel with current values and allowed ranges.
pub fn controls(record: &CustomerRecord) -> String {
    let mut out = String::from("Customer attributes:\n");
    for spec in &CONTROLS {
        let range = match spec.control {
            Control::Slider { min, max, step: Some(_), .. } => format!("{min:.0}..={max:.0}"),
            Control::Slider { min, max, step: None, .. } => format!("{min:.1}..={max:.1}"),
            Control::Checkbox { .. } => "yes/no".to_string(),
            Control::Select { options, .. } => options.join("/"),
        };
        let _ = writeln!(
            out,
            "  {:<20} {:>12}   [{}] ({})",
            spec.label,
            record.display_value(spec.field),
            range,
            spec.field
        );
    }
    out
}

/// The raw input row, one `column: value` pair per line.
pub fn record(record: &CustomerRecord) -> String {
    let mut out = String::from("Input record:\n");
    for spec in &CONTROLS {
        let _ = writeln!(
            out,
            "  {:>16}: {}",
            spec.field.name(),
            record.display_value(spec.field)
        );
    }
    out
}

pub fn confidence(confidence: &Confidence) -> String {
    match confidence {
        Confidence::Estimated(p) => format!("{:.2}%", p * 100.0),
        Confidence::Unsupported => "unavailable".to_string(),
        Confidence::Failed(reason) => format!("unavailable ({reason})"),
    }
}

/// Horizontal bar chart, longest bar = `width` characters.
pub fn importance_chart(ranked: &[RankedImportance], width: usize) -> String {
    let max = ranked
        .iter()
        .map(|r| r.score)
        .fold(0.0_f64, f64::max);
    let mut out = String::from("Feature importance:\n");
    for item in ranked {
        let bar = if max > 0.0 {
            ((item.score / max) * width as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {:>16} | {:<width$} {:.3}",
            item.field.name(),
            "#".repeat(bar),
            item.score,
        );
    }
    out
}

pub fn prediction(prediction: &Prediction, chart_width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Model: {}", prediction.model_type);
    let _ = writeln!(out, "Prediction: {}", prediction.label);
    let _ = writeln!(out, "Confidence: {}", confidence(&prediction.confidence));
    if let Some(ranked) = &prediction.importances {
        out.push_str(&importance_chart(ranked, chart_width));
    }
    out
}

pub fn cycle_error(err: &CycleError) -> String {
    match err {
        CycleError::Encoding(err) => encoding_error(err),
        CycleError::Prediction(err) => prediction_error(err),
    }
}

fn encoding_error(err: &EncodingError) -> String {
    let mut out = format!("Encoding failed: {err}\n");
    out.push_str(&record(&err.record));
    out.push_str("Encoded so far:\n");
    for (field, value) in &err.partial {
        let _ = writeln!(out, "  {:>16}: {}", field.name(), value);
    }
    out
}

fn prediction_error(err: &PredictionError) -> String {
    let mut out = format!("Prediction failed: {err}\nEncoded record:\n");
    for (field, value) in err.record.columns() {
        let _ = writeln!(out, "  {:>16}: {}", field.name(), value);
    }
    out
}

/// First rows of the sample dataset as a simple aligned table.
pub fn sample(table: &SampleTable) -> String {
    let widths: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    let mut out = format!("Sample data (first {} rows):\n", table.rows.len());
    let _ = writeln!(out, "  {}", line(&table.headers));
    for row in &table.rows {
        let _ = writeln!(out, "  {}", line(row));
    }
    out
}
