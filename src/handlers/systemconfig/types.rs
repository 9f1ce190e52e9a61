//! Request and response bodies of the system config API.

use crate::{
    domain::entity::{Env, SystemConfig},
    errcode,
    error::AppError,
    handlers::{Validate, require},
};
use serde::{Deserialize, Serialize};

fn parse_env(value: &str) -> Result<Env, AppError> {
    value
        .parse()
        .map_err(|e| AppError::cause(errcode::INVALID_PARAMS, "failed to validate request", e))
}

/// Body of `POST /api/v1/systemconfig`.
///
/// ```json
/// {
///   "tenant": "acme",
///   "env": "prod",
///   "type": "cache",
///   "config": "{\"nodes\": 3}",
///   "description": "shared redis",
///   "creator": "alice"
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSystemConfigRequest {
    pub tenant: String,
    pub env: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub config: String,
    pub description: String,
    pub creator: String,
    pub modifier: String,
}

impl Validate for CreateSystemConfigRequest {
    fn validate(&self) -> Result<(), AppError> {
        require("tenant", &self.tenant)?;
        require("env", &self.env)?;
        require("type", &self.kind)?;
        require("config", &self.config)?;
        require("creator", &self.creator)?;
        parse_env(&self.env)?;
        Ok(())
    }
}

impl CreateSystemConfigRequest {
    /// Converts the payload into an unsaved entity.
    pub fn into_entity(self) -> Result<SystemConfig, AppError> {
        let mut entity = SystemConfig::new(self.tenant, parse_env(&self.env)?, self.kind);
        entity.config = self.config;
        entity.description = self.description;
        entity.creator = self.creator;
        entity.modifier = self.modifier;
        Ok(entity)
    }
}

/// Body of `PUT /api/v1/systemconfig`.
///
/// Only `id` is required; blank fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSystemConfigRequest {
    pub id: i64,
    pub tenant: String,
    pub env: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub config: String,
    pub description: String,
    pub creator: String,
    pub modifier: String,
}

impl Validate for UpdateSystemConfigRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.id <= 0 {
            return Err(AppError::cause(
                errcode::BLANK_REQUIRED_PARAMS,
                "failed to validate request",
                "field \"id\" is required",
            ));
        }
        if !self.env.is_empty() {
            parse_env(&self.env)?;
        }
        Ok(())
    }
}

impl UpdateSystemConfigRequest {
    /// Overwrites the fields of `existing` that are non-empty in the request.
    pub fn merge_into(self, existing: &mut SystemConfig) -> Result<(), AppError> {
        fn overwrite(target: &mut String, value: String) {
            if !value.is_empty() {
                *target = value;
            }
        }

        if !self.env.is_empty() {
            existing.env = parse_env(&self.env)?;
        }
        overwrite(&mut existing.tenant, self.tenant);
        overwrite(&mut existing.kind, self.kind);
        overwrite(&mut existing.config, self.config);
        overwrite(&mut existing.description, self.description);
        overwrite(&mut existing.creator, self.creator);
        overwrite(&mut existing.modifier, self.modifier);
        Ok(())
    }
}

/// Body of `GET /api/v1/systemconfig/count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountSystemConfigResponse {
    pub total: i64,
}
