//! Extractors whose rejections render as `AppError` (400 with a JSON body).

use axum::extract::{Json, Path, Query};
use axum_extra::extract::WithRejection;

use crate::error::AppError;

pub type JsonBody<T> = WithRejection<Json<T>, AppError>;
pub type PathParam<T> = WithRejection<Path<T>, AppError>;
pub type QueryParams<T> = WithRejection<Query<T>, AppError>;
