//! Object fixtures shared by the integration tests

#![allow(dead_code)]

use kubegen_core::Object;
use kubegen_core::model::{
    Container, Deployment, DeploymentSpec, IntOrString, ObjectMeta, PodSpec, PodTemplateSpec,
    SecurityContext, Service, ServicePort, ServiceSpec,
};

pub fn service(name: &str) -> Object {
    Service {
        metadata: ObjectMeta::named(name).with_label("app", name),
        spec: ServiceSpec {
            ports: vec![ServicePort {
                name: "http".into(),
                port: 80,
                target_port: Some(IntOrString::Int(8080)),
                ..ServicePort::default()
            }],
            selector: [("app".to_string(), name.to_string())].into(),
            ..ServiceSpec::default()
        },
        ..Service::default()
    }
    .into()
}

/// Deployment whose container sets `runAsUser` and leaves resources unset.
pub fn deployment(name: &str) -> Object {
    let mut container = Container::new(name, "api-server");
    container.security_context = SecurityContext {
        run_as_user: Some(1000),
        ..SecurityContext::default()
    };

    Deployment {
        metadata: ObjectMeta::named(name),
        spec: DeploymentSpec {
            replicas: Some(2),
            template: PodTemplateSpec {
                metadata: ObjectMeta::default().with_label("app", name),
                spec: PodSpec {
                    containers: vec![container],
                    ..PodSpec::default()
                },
                ..PodTemplateSpec::default()
            },
            ..DeploymentSpec::default()
        },
        ..Deployment::default()
    }
    .into()
}
