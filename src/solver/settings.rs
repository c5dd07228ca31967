use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Error type returned on invalid settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Bad value assigned to a setting
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
}

/// Solver configuration.
///
/// Defaults are targeted at receding-horizon use, where a warm problem is
/// re-solved every sampling period and moderate accuracy is enough.
#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings<T: FloatT> {
    ///maximum number of iterations
    #[builder(default = "50")]
    pub max_iter: u32,

    ///maximum run time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///complementarity tolerance on μ = lᵀs / nb
    #[builder(default = "(1e-6).as_T()")]
    pub tol_compl: T,

    ///relative duality gap tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub tol_gap_rel: T,

    ///equality residual tolerance (dynamics and stationarity)
    #[builder(default = "(1e-6).as_T()")]
    pub tol_eq: T,

    ///bound violation tolerance
    #[builder(default = "(1e-6).as_T()")]
    pub tol_ineq: T,

    ///fraction of the distance to the boundary taken by the combined step
    #[builder(default = "(0.995).as_T()")]
    pub max_step_fraction: T,

    ///backtracking ratio for the affine step line search
    #[builder(default = "(0.9).as_T()")]
    pub ls_scale_affine: T,

    ///backtracking ratio for the combined step line search
    #[builder(default = "(0.9).as_T()")]
    pub ls_scale_combined: T,

    ///smallest step length the line searches will return
    #[builder(default = "(1e-9).as_T()")]
    pub ls_min_step: T,

    ///pivots below this threshold are floored during factorization
    #[builder(default = "(1e-13).as_T()")]
    pub pivot_floor_eps: T,

    ///replacement value for a floored pivot
    #[builder(default = "(0.02).as_T()")]
    pub pivot_floor_value: T,

    ///magnitude bound applied to triangular solve intermediates
    #[builder(default = "(1e30).as_T()")]
    pub saturation_bound: T,
}

impl<T> Default for Settings<T>
where
    T: FloatT,
{
    fn default() -> Settings<T> {
        SettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> Settings<T>
where
    T: FloatT,
{
    /// Checks that the settings are valid.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let unit = T::zero()..T::one();

        if !unit.contains(&self.max_step_fraction) {
            return Err(SettingsError::BadFieldValue("max_step_fraction"));
        }
        if !unit.contains(&self.ls_scale_affine) {
            return Err(SettingsError::BadFieldValue("ls_scale_affine"));
        }
        if !unit.contains(&self.ls_scale_combined) {
            return Err(SettingsError::BadFieldValue("ls_scale_combined"));
        }
        if self.ls_min_step <= T::zero() {
            return Err(SettingsError::BadFieldValue("ls_min_step"));
        }
        if self.tol_compl <= T::zero()
            || self.tol_gap_rel <= T::zero()
            || self.tol_eq <= T::zero()
            || self.tol_ineq <= T::zero()
        {
            return Err(SettingsError::BadFieldValue("tolerances"));
        }
        if self.pivot_floor_value <= T::zero() {
            return Err(SettingsError::BadFieldValue("pivot_floor_value"));
        }
        if self.saturation_bound <= T::zero() {
            return Err(SettingsError::BadFieldValue("saturation_bound"));
        }
        if self.time_limit.is_nan() || self.time_limit < 0. {
            return Err(SettingsError::BadFieldValue("time_limit"));
        }
        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for SettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        SettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> SettingsBuilder<T>
where
    T: FloatT,
{
    fn validate(&self) -> Result<(), SettingsError> {
        if let Some(f) = self.max_step_fraction {
            if !(T::zero()..T::one()).contains(&f) {
                return Err(SettingsError::BadFieldValue("max_step_fraction"));
            }
        }
        if let Some(t) = self.time_limit {
            if t.is_nan() || t < 0. {
                return Err(SettingsError::BadFieldValue("time_limit"));
            }
        }
        Ok(())
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    SettingsBuilder::<f64>::default().build().unwrap();

    // fail on a step fraction outside (0, 1)
    assert!(SettingsBuilder::<f64>::default()
        .max_step_fraction(1.5)
        .build()
        .is_err());

    // fail on a negative time limit
    assert!(SettingsBuilder::<f64>::default()
        .time_limit(-1.0)
        .build()
        .is_err());

    // directly construct bad Settings and manually check
    let settings = Settings::<f64> {
        tol_compl: 0.0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}
