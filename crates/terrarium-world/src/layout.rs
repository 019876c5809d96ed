//! Plan parsing and random valley generation.

use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use terrarium_core::{Error, Result, ValleyConfig, EMPTY_GLYPH};

/// Split a textual plan into rows
pub fn rows_from_plan(plan: &str) -> Vec<String> {
    plan.lines().map(str::to_owned).collect()
}

/// Check that a layout is a non-empty rectangle and return its dimensions
pub(crate) fn validate_rows(rows: &[String]) -> Result<(i32, i32)> {
    let Some(first) = rows.first() else {
        return Err(Error::EmptyLayout);
    };

    let expected = first.chars().count();
    if expected == 0 {
        return Err(Error::EmptyLayout);
    }

    for (row, line) in rows.iter().enumerate() {
        let found = line.chars().count();
        if found != expected {
            return Err(Error::RaggedLayout {
                row,
                expected,
                found,
            });
        }
    }

    Ok((expected as i32, rows.len() as i32))
}

/// Generate a wall-bordered layout with randomly scattered entities.
///
/// The requested counts are placed on distinct interior cells; the border
/// adds one wall cell on every side on top of the configured interior size.
pub fn generate_valley(config: &ValleyConfig, rng: &mut ChaCha8Rng) -> Result<Vec<String>> {
    if config.width == 0 || config.height == 0 {
        return Err(Error::Config(format!(
            "valley interior must be at least 1x1, got {}x{}",
            config.width, config.height
        )));
    }

    let capacity = config.width * config.height;
    let requested: usize = config.counts.values().sum();
    if requested > capacity {
        return Err(Error::Overcrowded {
            requested,
            capacity,
        });
    }

    let mut interior = vec![EMPTY_GLYPH; capacity];
    let picks = index::sample(rng, capacity, requested);
    let mut slots = picks.iter();
    for (&glyph, &count) in &config.counts {
        for _ in 0..count {
            if let Some(slot) = slots.next() {
                interior[slot] = glyph;
            }
        }
    }

    let border = "#".repeat(config.width + 2);
    let mut rows = Vec::with_capacity(config.height + 2);
    rows.push(border.clone());
    for chunk in interior.chunks(config.width) {
        let body: String = chunk.iter().collect();
        rows.push(format!("#{body}#"));
    }
    rows.push(border);

    Ok(rows)
}
