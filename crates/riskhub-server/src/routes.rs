//! Full route tree

use crate::error::handle_rejection;
use crate::resource::{
    Indicators, Monitoring, RiskCategories, RiskInherent, RiskResidual, Risks, StrategicPlans,
    SwotFactors, TowsStrategies, WorkUnits,
};
use crate::state::AppState;
use crate::{aggregates, auth_api, crud, pages, reports};
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Reply};

/// JSON API under `/api`
///
/// Aggregate paths such as `/api/swot-analisis/summary` are mounted ahead of
/// the CRUD item routes so they are not parsed as ids.
pub fn api(state: AppState) -> BoxedFilter<(Response,)> {
    auth_api::routes(state.clone())
        .or(aggregates::routes(state.clone()))
        .unify()
        .or(reports::routes(state.clone()))
        .unify()
        .or(crud::routes::<Risks>(state.clone()))
        .unify()
        .or(crud::routes::<RiskInherent>(state.clone()))
        .unify()
        .or(crud::routes::<RiskResidual>(state.clone()))
        .unify()
        .or(crud::routes::<Monitoring>(state.clone()))
        .unify()
        .or(crud::routes::<SwotFactors>(state.clone()))
        .unify()
        .or(crud::routes::<TowsStrategies>(state.clone()))
        .unify()
        .or(crud::routes::<StrategicPlans>(state.clone()))
        .unify()
        .or(crud::routes::<Indicators>(state.clone()))
        .unify()
        .or(crud::routes::<WorkUnits>(state.clone()))
        .unify()
        .or(crud::routes::<RiskCategories>(state))
        .unify()
        .boxed()
}

/// API, pages and rejection handling, ready to serve
pub fn routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = std::convert::Infallible> + Clone {
    api(state.clone())
        .or(pages::routes(state))
        .recover(handle_rejection)
        .with(warp::trace::request())
}
