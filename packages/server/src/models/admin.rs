use serde::Deserialize;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Drop the cached counts and recompute.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SweepQuery {
    /// Report orphans without removing them.
    #[serde(default)]
    pub dry_run: bool,
}
