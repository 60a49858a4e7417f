//! Managed instance types (`aws/ec2/managedInstance`)

use modelkit::{OverrideTable, Schema, TypeDescriptor, TypeRegistry};

pub const ROOT: &str = "managed_instance";

/// Type used to map `managed_instance_config.deletion_config`
pub const DELETION_CONFIG: &str = "DeletionConfig";

static TYPES: &[TypeDescriptor] = &[
    TypeDescriptor::new(
        "ManagedInstance",
        &[
            "name",
            "region",
            "description",
            "persistence",
            "health_check",
            "scheduling",
            "strategy",
            "compute",
            "integrations",
        ],
    ),
    TypeDescriptor::new(
        "Persistence",
        &[
            "persist_root_device",
            "persist_block_devices",
            "persist_private_ip",
            "block_devices_mode",
        ],
    ),
    TypeDescriptor::new(
        "HealthCheck",
        &["type", "auto_healing", "grace_period", "unhealthy_duration"],
    ),
    TypeDescriptor::new("Scheduling", &["tasks"]),
    TypeDescriptor::new(
        "Task",
        &[
            "task_type",
            "start_time",
            "cron_expression",
            "is_enabled",
            "frequency",
        ],
    ),
    TypeDescriptor::new(
        "Strategy",
        &[
            "life_cycle",
            "orientation",
            "draining_timeout",
            "fallback_to_od",
            "utilize_reserved_instances",
            "utilize_commitments",
            "optimization_windows",
            "minimum_instance_lifetime",
            "revert_to_spot",
        ],
    ),
    TypeDescriptor::new("RevertToSpot", &["perform_at"]),
    TypeDescriptor::new(
        "Compute",
        &[
            "subnet_ids",
            "vpc_id",
            "elastic_ip",
            "private_ip",
            "product",
            "launch_specification",
        ],
    ),
    TypeDescriptor::new(
        "LaunchSpecification",
        &[
            "instance_types",
            "ebs_optimized",
            "monitoring",
            "tenancy",
            "iam_role",
            "security_group_ids",
            "image_id",
            "key_pair",
            "tags",
            "resource_tag_specification",
            "user_data",
            "shutdown_script",
            "credit_specification",
            "network_interfaces",
            "block_device_mappings",
        ],
    ),
    TypeDescriptor::new("InstanceTypes", &["preferred_type", "types"]),
    TypeDescriptor::new("IamRole", &["name", "arn"]),
    TypeDescriptor::new("Tags", &["tag_key", "tag_value"]),
    TypeDescriptor::new(
        "ResourceTagSpecification",
        &["volumes", "snapshots", "enis", "amis"],
    ),
    TypeDescriptor::new("Volumes", &["should_tag"]),
    TypeDescriptor::new("Snapshots", &["should_tag"]),
    TypeDescriptor::new("Enis", &["should_tag"]),
    TypeDescriptor::new("Amis", &["should_tag"]),
    TypeDescriptor::new("CreditSpecification", &["cpu_credits"]),
    TypeDescriptor::new(
        "NetworkInterfaces",
        &[
            "device_index",
            "associate_ipv6_address",
            "associate_public_ip_address",
        ],
    ),
    TypeDescriptor::new(
        "BlockDeviceMappings",
        &["device_name", "no_device", "virtual_name", "ebs"],
    ),
    TypeDescriptor::new(
        "Ebs",
        &[
            "delete_on_termination",
            "encrypted",
            "iops",
            "throughput",
            "volume_size",
            "volume_type",
            "kms_key_id",
            "snapshot_id",
        ],
    ),
    TypeDescriptor::new("IntegrationsConfig", &["route53", "load_balancers_config"]),
    TypeDescriptor::new("Route53Configuration", &["domains"]),
    TypeDescriptor::new(
        "Route53DomainConfiguration",
        &[
            "hosted_zone_id",
            "spotinst_account_id",
            "record_set_type",
            "record_sets",
        ],
    ),
    TypeDescriptor::new(
        "Route53RecordSetConfiguration",
        &["name", "use_public_ip", "use_public_dns"],
    ),
    TypeDescriptor::new("LoadBalancersConfiguration", &["load_balancers"]),
    TypeDescriptor::new(
        "LoadBalancer",
        &[
            "name",
            "arn",
            "type",
            "balancer_id",
            "target_set_id",
            "az_awareness",
            "auto_weight",
        ],
    ),
    // Delete options
    TypeDescriptor::new(DELETION_CONFIG, &["ami_backup", "deallocation_config"]),
    TypeDescriptor::new(
        "DeallocationConfig",
        &[
            "deallocate_network_interfaces",
            "deallocate_volumes",
            "deallocate_snapshots",
            "deallocate_amis",
            "should_terminate_instance",
        ],
    ),
    TypeDescriptor::new("AmiBackup", &["should_delete_images"]),
];

static OVERRIDES: &[(&str, &str)] = &[
    (
        "managed_instance.integrations.load_balancers_config",
        "LoadBalancersConfiguration",
    ),
    ("managed_instance.integrations.route53", "Route53Configuration"),
    ("managed_instance.integrations", "IntegrationsConfig"),
    (
        "managed_instance.integrations.route53.domains.record_sets",
        "Route53RecordSetConfiguration",
    ),
    (
        "managed_instance.integrations.route53.domains",
        "Route53DomainConfiguration",
    ),
    ("managed_instance.scheduling.tasks", "Task"),
    (
        "managed_instance.integrations.load_balancers_config.load_balancers",
        "LoadBalancer",
    ),
];

pub fn schema() -> Schema {
    Schema::new(
        ROOT,
        TypeRegistry::from_descriptors(TYPES),
        OverrideTable::from_pairs(OVERRIDES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelkit::Model;
    use serde_json::{Value, json};

    fn example() -> Value {
        json!({
            "fake_plain_list": [1, 2],
            "fake_field": [[1, 2, 3], [4, 5, 6]],
            "name": "mi-managed-instance-example",
            "description": "a nicely managed instance",
            "region": "us-west-2",
            "persistence": {
                "persist_block_devices": true,
                "persist_root_device": true,
                "block_devices_mode": "onLaunch",
                "persist_private_ip": null
            },
            "strategy": {
                "life_cycle": "spot",
                "revert_to_spot": { "perform_at": "always" },
                "orientation": null,
                "draining_timeout": null
            },
            "health_check": { "type": "EC2", "grace_period": 120, "unhealthy_duration": 120 },
            "compute": {
                "product": "Linux/UNIX",
                "subnet_ids": ["subnet-0d67e8b90c74986c8"],
                "vpc_id": "vpc-4a74eb32",
                "elastic_ip": null,
                "launch_specification": {
                    "image_id": "ami-082b5a644766e0e6f",
                    "instance_types": {
                        "types": ["t2.micro", "t3.small", "t3.micro"],
                        "preferred_type": "t2.micro"
                    },
                    "key_pair": "core-oregon",
                    "security_group_ids": ["sg-03ea0016f98e3c04d"],
                    "iam_role": null,
                    "tags": [{ "tag_key": "env", "tag_value": "dev" }],
                    "block_device_mappings": [
                        { "device_name": "/dev/xvda", "ebs": { "volume_size": 30, "volume_type": "gp3" } }
                    ]
                }
            },
            "scheduling": {
                "tasks": [{
                    "is_enabled": true,
                    "frequency": "weekly",
                    "start_time": "2050-22-22T00:00:00Z",
                    "task_type": "pause",
                    "cron_expression": null
                }]
            },
            "integrations": {
                "route53": {
                    "domains": [{
                        "hosted_zone_id": "1",
                        "spotinst_account_id": "act-xxx",
                        "record_set_type": "a",
                        "record_sets": [{ "name": "some_name", "use_public_ip": true, "use_public_dns": null }]
                    }]
                },
                "load_balancers_config": {
                    "load_balancers": [{ "name": "lb", "type": "TARGET_GROUP", "arn": "arn:aws:x" }]
                }
            }
        })
    }

    #[test]
    fn test_all_fields() {
        let schema = schema();
        let mi = schema.mapper().map_root(&example()).unwrap();

        assert_eq!(mi.type_name(), "ManagedInstance");
        assert_eq!(mi.get_str("name"), Some("mi-managed-instance-example"));
        assert_eq!(mi.get_str("region"), Some("us-west-2"));

        // Undeclared keys survive untouched
        assert_eq!(mi.get("fake_plain_list").unwrap().to_wire(), json!([1, 2]));
        assert_eq!(
            mi.get("fake_field").unwrap().to_wire(),
            json!([[1, 2, 3], [4, 5, 6]])
        );

        let persistence = mi.get_object("persistence").unwrap();
        assert_eq!(persistence.type_name(), "Persistence");
        assert!(!persistence.has("persist_private_ip"));
        assert_eq!(persistence.get_str("block_devices_mode"), Some("onLaunch"));

        assert_eq!(
            mi.lookup("strategy.revert_to_spot.perform_at")
                .and_then(Model::as_str),
            Some("always")
        );
        assert!(mi.lookup("strategy.orientation").is_none());

        let spec = mi
            .lookup("compute.launch_specification")
            .and_then(Model::as_object)
            .unwrap();
        assert_eq!(spec.type_name(), "LaunchSpecification");
        assert_eq!(
            spec.get_object("instance_types").unwrap().type_name(),
            "InstanceTypes"
        );
        let bdm = spec.get_list("block_device_mappings").unwrap()[0]
            .as_object()
            .unwrap();
        assert_eq!(bdm.type_name(), "BlockDeviceMappings");
        assert_eq!(bdm.get_object("ebs").unwrap().type_name(), "Ebs");

        let task = mi.lookup("scheduling.tasks").and_then(Model::as_list).unwrap()[0]
            .as_object()
            .unwrap();
        assert_eq!(task.type_name(), "Task");
        assert_eq!(task.get("is_enabled"), Some(&Model::Bool(true)));
        assert!(!task.has("cron_expression"));

        let integrations = mi.get_object("integrations").unwrap();
        assert_eq!(integrations.type_name(), "IntegrationsConfig");
        let domain = integrations
            .lookup("route53.domains")
            .and_then(Model::as_list)
            .unwrap()[0]
            .as_object()
            .unwrap();
        assert_eq!(domain.type_name(), "Route53DomainConfiguration");
        let record_set = domain.get_list("record_sets").unwrap()[0]
            .as_object()
            .unwrap();
        assert_eq!(record_set.type_name(), "Route53RecordSetConfiguration");
        assert!(!record_set.has("use_public_dns"));

        let lb = integrations
            .lookup("load_balancers_config.load_balancers")
            .and_then(Model::as_list)
            .unwrap()[0]
            .as_object()
            .unwrap();
        assert_eq!(lb.type_name(), "LoadBalancer");
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let schema = schema();
        let wire = schema.mapper().map_root(&example()).unwrap().to_wire();

        assert_eq!(wire["healthCheck"]["gracePeriod"], 120);
        assert_eq!(
            wire["compute"]["launchSpecification"]["instanceTypes"]["preferredType"],
            "t2.micro"
        );
        assert_eq!(
            wire["integrations"]["route53"]["domains"][0]["recordSets"][0]["usePublicIp"],
            true
        );
    }

    #[test]
    fn test_deletion_config() {
        let schema = schema();
        let config = schema
            .mapper()
            .map_as(
                &json!({
                    "deallocation_config": { "deallocate_volumes": true, "should_terminate_instance": true },
                    "ami_backup": { "should_delete_images": false }
                }),
                DELETION_CONFIG,
                "deletion_config",
            )
            .unwrap();

        assert_eq!(
            config.to_wire(),
            json!({
                "amiBackup": { "shouldDeleteImages": false },
                "deallocationConfig": { "deallocateVolumes": true, "shouldTerminateInstance": true }
            })
        );
    }
}
