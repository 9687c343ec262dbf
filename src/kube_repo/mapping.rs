// Map Kubernetes API objects onto the cluster payload models

use crate::models::{
    DeploymentInfo, NamespaceInfo, NodeAddressInfo, NodeInfo, PersistentVolumeClaimInfo,
    PersistentVolumeInfo, PodContainerInfo, PodInfo, ServiceInfo, ServicePortInfo,
};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{
    Namespace, Node, PersistentVolume, PersistentVolumeClaim, Pod, Service,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

fn name(meta: &ObjectMeta) -> String {
    meta.name.clone().unwrap_or_default()
}

fn namespace(meta: &ObjectMeta) -> String {
    meta.namespace.clone().unwrap_or_default()
}

fn created(meta: &ObjectMeta) -> Option<String> {
    meta.creation_timestamp.as_ref().map(|Time(t)| t.to_string())
}

fn quantities(q: Option<&BTreeMap<String, Quantity>>) -> BTreeMap<String, String> {
    q.map(|m| m.iter().map(|(k, Quantity(v))| (k.clone(), v.clone())).collect())
        .unwrap_or_default()
}

pub(crate) fn deployment(d: &Deployment) -> DeploymentInfo {
    let status = d.status.as_ref();
    DeploymentInfo {
        name: name(&d.metadata),
        namespace: namespace(&d.metadata),
        available_replicas: status.and_then(|s| s.available_replicas).unwrap_or(0),
        ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        updated_replicas: status.and_then(|s| s.updated_replicas).unwrap_or(0),
        total_replicas: status.and_then(|s| s.replicas).unwrap_or(0),
        created: created(&d.metadata),
    }
}

pub(crate) fn namespace_info(n: &Namespace) -> NamespaceInfo {
    NamespaceInfo {
        name: name(&n.metadata),
        created: created(&n.metadata),
    }
}

pub(crate) fn node(n: &Node) -> NodeInfo {
    let spec = n.spec.as_ref();
    let status = n.status.as_ref();
    NodeInfo {
        name: name(&n.metadata),
        created: created(&n.metadata),
        unschedulable: spec.and_then(|s| s.unschedulable).unwrap_or(false),
        addresses: status
            .and_then(|s| s.addresses.as_ref())
            .map(|a| {
                a.iter()
                    .map(|a| NodeAddressInfo {
                        kind: a.type_.clone(),
                        address: a.address.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        pod_cidrs: spec.and_then(|s| s.pod_cidrs.clone()).unwrap_or_default(),
        volumes_in_use: status
            .and_then(|s| s.volumes_in_use.clone())
            .unwrap_or_default(),
        volumes_attached: status
            .and_then(|s| s.volumes_attached.as_ref())
            .map(|v| v.iter().map(|v| v.name.clone()).collect())
            .unwrap_or_default(),
    }
}

pub(crate) fn pod(p: &Pod) -> PodInfo {
    let spec = p.spec.as_ref();
    let status = p.status.as_ref();
    PodInfo {
        name: name(&p.metadata),
        namespace: namespace(&p.metadata),
        created: created(&p.metadata),
        phase: status.and_then(|s| s.phase.clone()).unwrap_or_default(),
        host_ip: status.and_then(|s| s.host_ip.clone()).unwrap_or_default(),
        pod_ip: status.and_then(|s| s.pod_ip.clone()).unwrap_or_default(),
        node_name: spec.and_then(|s| s.node_name.clone()).unwrap_or_default(),
        scheduler_name: spec
            .and_then(|s| s.scheduler_name.clone())
            .unwrap_or_default(),
        containers: spec
            .map(|s| {
                s.containers
                    .iter()
                    .map(|c| PodContainerInfo {
                        name: c.name.clone(),
                        image: c.image.clone().unwrap_or_default(),
                        ports: c
                            .ports
                            .as_ref()
                            .map(|p| p.iter().map(|p| p.container_port).collect())
                            .unwrap_or_default(),
                    })
                    .collect()
            })
            .unwrap_or_default(),
        volumes: spec
            .and_then(|s| s.volumes.as_ref())
            .map(|v| v.iter().map(|v| v.name.clone()).collect())
            .unwrap_or_default(),
    }
}

pub(crate) fn service(s: &Service) -> ServiceInfo {
    let spec = s.spec.as_ref();
    ServiceInfo {
        name: name(&s.metadata),
        namespace: namespace(&s.metadata),
        created: created(&s.metadata),
        type_: spec.and_then(|s| s.type_.clone()).unwrap_or_default(),
        cluster_ip: spec.and_then(|s| s.cluster_ip.clone()).unwrap_or_default(),
        cluster_ips: spec.and_then(|s| s.cluster_ips.clone()).unwrap_or_default(),
        external_ips: spec
            .and_then(|s| s.external_ips.clone())
            .unwrap_or_default(),
        external_name: spec
            .and_then(|s| s.external_name.clone())
            .unwrap_or_default(),
        load_balancer_ip: spec
            .and_then(|s| s.load_balancer_ip.clone())
            .unwrap_or_default(),
        ports: spec
            .and_then(|s| s.ports.as_ref())
            .map(|ports| {
                ports
                    .iter()
                    .map(|p| ServicePortInfo {
                        name: p.name.clone().unwrap_or_default(),
                        protocol: p.protocol.clone().unwrap_or_default(),
                        port: p.port,
                        node_port: p.node_port,
                        target_port: p.target_port.as_ref().map(|t| match t {
                            IntOrString::Int(i) => i.to_string(),
                            IntOrString::String(s) => s.clone(),
                        }),
                    })
                    .collect()
            })
            .unwrap_or_default(),
    }
}

pub(crate) fn persistent_volume(pv: &PersistentVolume) -> PersistentVolumeInfo {
    let spec = pv.spec.as_ref();
    PersistentVolumeInfo {
        name: name(&pv.metadata),
        created: created(&pv.metadata),
        capacity: quantities(spec.and_then(|s| s.capacity.as_ref())),
        access_modes: spec
            .and_then(|s| s.access_modes.clone())
            .unwrap_or_default(),
        reclaim_policy: spec
            .and_then(|s| s.persistent_volume_reclaim_policy.clone())
            .unwrap_or_default(),
        status: pv
            .status
            .as_ref()
            .and_then(|s| s.phase.clone())
            .unwrap_or_default(),
        storage_class: spec
            .and_then(|s| s.storage_class_name.clone())
            .unwrap_or_default(),
        volume_mode: spec
            .and_then(|s| s.volume_mode.clone())
            .unwrap_or_default(),
    }
}

pub(crate) fn persistent_volume_claim(pvc: &PersistentVolumeClaim) -> PersistentVolumeClaimInfo {
    let spec = pvc.spec.as_ref();
    let status = pvc.status.as_ref();
    PersistentVolumeClaimInfo {
        name: name(&pvc.metadata),
        namespace: namespace(&pvc.metadata),
        created: created(&pvc.metadata),
        status: status.and_then(|s| s.phase.clone()).unwrap_or_default(),
        access_modes: spec
            .and_then(|s| s.access_modes.clone())
            .unwrap_or_default(),
        storage_class: spec
            .and_then(|s| s.storage_class_name.clone())
            .unwrap_or_default(),
        volume_mode: spec
            .and_then(|s| s.volume_mode.clone())
            .unwrap_or_default(),
        capacity: quantities(status.and_then(|s| s.capacity.as_ref())),
    }
}
