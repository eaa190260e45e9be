// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom machine image imported from object storage.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use super::resource_group::resolve_resource_group;
use super::tagging::tag_resource;
use super::{ClusterScope, Outcome, Reconcile};
use crate::cloud::model::{Image, ImagePrototype, ResourceState};
use crate::constants::image::COS_SCHEME;
use crate::error::{ReconcileError, Result};
use crate::status::StatusKind;
use crate::types::network::{ImageSpec, VpcResourceStatus};
use crate::types::ResourceKind;

pub struct CustomImageReconciler;

#[async_trait]
impl Reconcile for CustomImageReconciler {
    fn kind(&self) -> ResourceKind {
        ResourceKind::CustomImage
    }

    #[instrument(skip_all, fields(cluster = %scope.cluster_name))]
    async fn reconcile(&self, scope: &mut ClusterScope<'_>) -> Result<Outcome> {
        let clouds = scope.clouds;
        let cluster_spec = scope.spec;
        let spec = cluster_spec.image.as_ref();
        let cached = scope.status.get(StatusKind::CustomImage, "").cloned();
        if spec.is_none() && cached.is_none() {
            return Ok(Outcome::Ready);
        }

        if let Some(cached) = cached.as_ref().filter(|c| !c.id.is_empty()) {
            if cached.ready {
                return Ok(Outcome::Ready);
            }
            let image = scope
                .call(
                    ResourceKind::CustomImage,
                    "get",
                    &cached.id,
                    clouds.vpc.get_image(&cached.id),
                )
                .await?
                .ok_or_else(|| {
                    ReconcileError::not_found(
                        ResourceKind::CustomImage,
                        &cached.id,
                        "cached image no longer exists",
                    )
                })?;
            return Ok(record(scope, image));
        }

        let name = cached
            .as_ref()
            .map(|c| c.name.as_str())
            .filter(|name| !name.is_empty())
            .or(spec.map(|s| s.name.as_str()))
            .unwrap_or_default()
            .to_string();
        if !name.is_empty() {
            let existing = scope
                .call(
                    ResourceKind::CustomImage,
                    "get",
                    &name,
                    clouds.vpc.get_image_by_name(&name),
                )
                .await?;
            if let Some(image) = existing {
                info!("Found existing custom image {} ({})", image.name, image.id);
                return Ok(record(scope, image));
            }
        }

        let Some(spec) = spec else {
            return Err(ReconcileError::precondition(
                ResourceKind::CustomImage,
                name,
                "image is not found and no image spec is defined to create it from",
            ));
        };
        create_image(scope, spec).await?;
        Ok(Outcome::Requeue)
    }
}

fn record(scope: &mut ClusterScope<'_>, image: Image) -> Outcome {
    let ready = image.state == ResourceState::Available;
    debug!("Custom image {} ({}) is {}", image.name, image.id, image.state);
    scope.status.put(
        StatusKind::CustomImage,
        "",
        VpcResourceStatus::new(image.id, image.name, ready),
    );
    Outcome::from_requeue(!ready)
}

async fn create_image(scope: &mut ClusterScope<'_>, spec: &ImageSpec) -> Result<()> {
    let clouds = scope.clouds;
    let missing = |field: &str| {
        ReconcileError::precondition(
            ResourceKind::CustomImage,
            &spec.name,
            format!("{} is required to create the image", field),
        )
    };
    let non_empty = |value: &Option<String>| value.as_deref().filter(|v| !v.is_empty()).map(str::to_string);

    non_empty(&spec.cos_instance).ok_or_else(|| missing("cosInstance"))?;
    let bucket = non_empty(&spec.cos_bucket).ok_or_else(|| missing("cosBucket"))?;
    let object = non_empty(&spec.cos_object).ok_or_else(|| missing("cosObject"))?;
    let operating_system = non_empty(&spec.operating_system).ok_or_else(|| missing("operatingSystem"))?;
    let region = non_empty(&spec.cos_bucket_region).unwrap_or_else(|| scope.spec.region.clone());

    let prototype = ImagePrototype {
        name: spec.name.clone(),
        resource_group_id: image_resource_group_id(scope, spec).await?,
        file_href: format!("{}://{}/{}/{}", COS_SCHEME, region, bucket, object),
        operating_system,
    };

    let image = scope
        .call(
            ResourceKind::CustomImage,
            "create",
            &spec.name,
            clouds.vpc.create_image(&prototype),
        )
        .await?;
    info!("Created custom image {} ({})", image.name, image.id);
    scope.status.put(
        StatusKind::CustomImage,
        "",
        VpcResourceStatus::new(image.id.clone(), image.name.clone(), false),
    );

    tag_resource(scope, ResourceKind::CustomImage, &spec.name, &image.crn).await
}

/// The image's own resource group, then the network one, then the cluster one
#[instrument(skip_all, fields(image = %spec.name))]
async fn image_resource_group_id(scope: &ClusterScope<'_>, spec: &ImageSpec) -> Result<String> {
    if let Some(reference) = &spec.resource_group {
        if let Some(id) = reference.id.as_deref().filter(|id| !id.is_empty()) {
            return Ok(id.to_string());
        }
        if let Some(name) = reference.name.as_deref().filter(|name| !name.is_empty()) {
            return Ok(resolve_resource_group(scope, name).await?.id);
        }
    }
    scope.network_resource_group_id()
}
