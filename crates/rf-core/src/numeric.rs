use crate::RfError;

/// Reject the first non-finite entry of `values`.
pub fn ensure_all_finite(values: &[f64], what: &'static str) -> Result<(), RfError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(RfError::NonFinite { what, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_all_finite_reports_offender() {
        let err = ensure_all_finite(&[0.0, f64::INFINITY, 1.0], "row").unwrap_err();
        assert_eq!(
            err,
            RfError::NonFinite {
                what: "row",
                value: f64::INFINITY
            }
        );
        assert!(format!("{err}").contains("Non-finite"));
        assert!(ensure_all_finite(&[0.0, -3.5], "row").is_ok());
    }
}
