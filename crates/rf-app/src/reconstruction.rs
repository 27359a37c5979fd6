//! Reconstruction of full-order fields for logged samples.

use std::path::Path;

use rf_core::SampleId;
use rf_fields::{Field, FieldStore, ModeBasis, load_basis, read_fields_in, reconstruct_state, scaled_lifting};
use rf_operators::ModeCounts;
use rf_results::OnlineSolutionLog;

use crate::config::ReconstructionDef;
use crate::error::{AppError, AppResult};

/// Bases and liftings matching a truncated operator set.
#[derive(Debug, Clone)]
pub struct ReconstructionInputs {
    /// Velocity modes followed by supremizer modes.
    pub velocity: ModeBasis,
    pub pressure: ModeBasis,
    /// One unit-inlet lifting per inlet coefficient; empty when the basis
    /// already carries the inlet data.
    pub unit_liftings: Vec<Field>,
}

pub fn load_inputs(def: &ReconstructionDef, modes: ModeCounts) -> AppResult<ReconstructionInputs> {
    let mut velocity = load_basis(&def.velocity_modes, modes.velocity)?;
    if modes.supremizer > 0 {
        let dir = def.supremizer_modes.as_deref().ok_or_else(|| {
            AppError::InvalidInput(format!(
                "{} supremizer modes in use but reconstruction.supremizer_modes is not set",
                modes.supremizer
            ))
        })?;
        velocity = velocity.chain(&load_basis(dir, modes.supremizer)?)?;
    }
    let pressure = load_basis(&def.pressure_modes, modes.pressure)?;
    let unit_liftings = match &def.liftings {
        Some(dir) => read_fields_in(dir)?,
        None => Vec::new(),
    };
    Ok(ReconstructionInputs {
        velocity,
        pressure,
        unit_liftings,
    })
}

/// Write `U` and `p` for each selected sample under `out_dir/<sample>/`.
/// Returns the number of samples written.
pub fn reconstruct_log(
    log: &OnlineSolutionLog,
    inputs: &ReconstructionInputs,
    inlet_velocity: &[f64],
    samples: Option<&[usize]>,
    out_dir: &Path,
) -> AppResult<usize> {
    let lifting = if inputs.unit_liftings.is_empty() {
        None
    } else {
        Some(scaled_lifting(&inputs.unit_liftings, inlet_velocity)?)
    };

    let selected: Option<Vec<SampleId>> = samples
        .map(|s| {
            s.iter()
                .map(|&n| SampleId::from_ordinal(n))
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()
        .map_err(|e| AppError::InvalidInput(e.to_string()))?;

    let store = FieldStore::new(out_dir.to_path_buf())?;
    let mut written = 0;
    for row in log.rows() {
        if let Some(selected) = &selected
            && !selected.contains(&row.sample)
        {
            continue;
        }
        let fields = reconstruct_state(
            &row.coefficients,
            &inputs.velocity,
            &inputs.pressure,
            lifting.as_ref(),
        )?;
        store.write(row.sample, &fields.velocity)?;
        store.write(row.sample, &fields.pressure)?;
        written += 1;
    }
    tracing::info!(samples = written, dir = %out_dir.display(), "reconstructed fields");
    Ok(written)
}
