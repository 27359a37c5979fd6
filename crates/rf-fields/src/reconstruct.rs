//! Mapping between reduced coefficients and full-order fields.

use crate::basis::ModeBasis;
use crate::field::Field;
use crate::{FieldError, FieldResult};
use nalgebra::DVector;

/// `lifting + sum_i coefficients[i] * basis[i]`.
///
/// Without a lifting the result starts from zero. The output carries the
/// name of the lifting, or of the first mode.
pub fn reconstruct(
    coefficients: &[f64],
    basis: &ModeBasis,
    lifting: Option<&Field>,
) -> FieldResult<Field> {
    if coefficients.len() != basis.len() {
        return Err(FieldError::length(
            "reconstruction coefficients",
            basis.len(),
            coefficients.len(),
        ));
    }
    let mut out = match (lifting, basis.mode(0)) {
        (Some(l), _) => l.clone(),
        (None, Some(first)) => Field::zeros(first.name.clone(), first.components, first.n_cells()),
        (None, None) => {
            return Err(FieldError::EmptyBasis {
                what: "reconstruction without lifting",
            });
        }
    };
    for (a, mode) in coefficients.iter().zip(basis.modes()) {
        out.axpy(*a, mode)?;
    }
    Ok(out)
}

/// Lifting for the current inlet data from unit-inlet lifting fields:
/// `sum_j velocity[j] * unit_liftings[j]`.
pub fn scaled_lifting(unit_liftings: &[Field], velocity: &[f64]) -> FieldResult<Field> {
    if unit_liftings.len() != velocity.len() {
        return Err(FieldError::length(
            "inlet velocity coefficients",
            unit_liftings.len(),
            velocity.len(),
        ));
    }
    let first = unit_liftings.first().ok_or(FieldError::EmptyBasis {
        what: "unit lifting fields",
    })?;
    let mut out = Field::zeros("lifting", first.components, first.n_cells());
    for (lifting, &u) in unit_liftings.iter().zip(velocity) {
        out.axpy(u, lifting)?;
    }
    Ok(out)
}

/// Least-squares coefficients of `field - lifting` in `basis`.
///
/// Solves the Gram system `(M^T M) a = M^T f`; Cholesky first, LU when the
/// Gram matrix is not numerically positive definite.
pub fn project(
    field: &Field,
    basis: &ModeBasis,
    lifting: Option<&Field>,
) -> FieldResult<DVector<f64>> {
    if basis.is_empty() {
        return Err(FieldError::EmptyBasis { what: "projection" });
    }
    let mut target = field.clone();
    if let Some(l) = lifting {
        target.axpy(-1.0, l)?;
    }

    let m = basis.to_matrix();
    if m.nrows() != target.len() {
        return Err(FieldError::length(
            format!("values of '{}'", field.name),
            m.nrows(),
            target.len(),
        ));
    }
    let rhs = m.tr_mul(&DVector::from_column_slice(&target.values));
    let gram = m.tr_mul(&m);

    if let Some(chol) = gram.clone().cholesky() {
        return Ok(chol.solve(&rhs));
    }
    gram.lu().solve(&rhs).ok_or_else(|| FieldError::SingularGram {
        name: field.name.clone(),
    })
}

/// Velocity and pressure fields of one online solution.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub velocity: Field,
    pub pressure: Field,
}

/// Split `y = [y_u, y_p]` over the velocity block basis (velocity then
/// supremizer modes) and the pressure basis and reconstruct both fields.
pub fn reconstruct_state(
    y: &[f64],
    velocity_basis: &ModeBasis,
    pressure_basis: &ModeBasis,
    lifting: Option<&Field>,
) -> FieldResult<Reconstruction> {
    let n_u = velocity_basis.len();
    let expected = n_u + pressure_basis.len();
    if y.len() != expected {
        return Err(FieldError::length("reduced coefficients", expected, y.len()));
    }
    Ok(Reconstruction {
        velocity: reconstruct(&y[..n_u], velocity_basis, lifting)?.renamed("U"),
        pressure: reconstruct(&y[n_u..], pressure_basis, None)?.renamed("p"),
    })
}
