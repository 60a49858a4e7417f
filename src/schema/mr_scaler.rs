//! EMR scaler types (`aws/emr/mrScaler`)

use modelkit::{OverrideTable, Schema, TypeDescriptor, TypeRegistry};

pub const ROOT: &str = "mr_scaler";

/// Fields the API only accepts on creation
///
/// An update carries `name`, `description`, core/task group `capacity` and
/// `cluster.termination_protected`; everything else is dropped.
pub const UPDATE_EXCLUSIONS: &[&str] = &[
    "region",
    "strategy",
    "scheduling",
    "scaling",
    "compute.ebs_root_volume_size",
    "compute.availability_zones",
    "compute.bootstrap_actions",
    "compute.steps",
    "compute.configurations",
    "compute.emr_managed_master_security_group",
    "compute.emr_managed_slave_security_group",
    "compute.additional_master_security_groups",
    "compute.additional_slave_security_groups",
    "compute.service_access_security_group",
    "compute.custom_ami_id",
    "compute.repo_upgrade_on_boot",
    "compute.ec2_key_name",
    "compute.applications",
    "compute.instance_groups.master_group",
    "compute.instance_groups.core_group.instance_types",
    "compute.instance_groups.core_group.target",
    "compute.instance_groups.core_group.life_cycle",
    "compute.instance_groups.core_group.ebs_configuration",
    "compute.instance_groups.core_group.configurations",
    "compute.instance_groups.task_group.instance_types",
    "compute.instance_groups.task_group.life_cycle",
    "compute.instance_groups.task_group.ebs_configuration",
    "compute.instance_groups.task_group.configurations",
    "cluster.visible_to_all_users",
    "cluster.keep_job_flow_alive_when_no_steps",
    "cluster.log_uri",
    "cluster.additional_info",
    "cluster.job_flow_role",
    "cluster.security_configuration",
];

static TYPES: &[TypeDescriptor] = &[
    TypeDescriptor::new(
        "MrScaler",
        &[
            "name",
            "description",
            "region",
            "strategy",
            "compute",
            "cluster",
            "scheduling",
            "scaling",
        ],
    ),
    TypeDescriptor::new(
        "Strategy",
        &["wrapping", "cloning", "new", "provisioning_timeout"],
    ),
    TypeDescriptor::new("Wrapping", &["source_cluster_id"]),
    TypeDescriptor::new(
        "Cloning",
        &["origin_cluster_id", "include_steps", "number_of_retries"],
    ),
    TypeDescriptor::new("New", &["release_label", "number_of_retries"]),
    TypeDescriptor::new("ProvisioningTimeout", &["timeout", "timeout_action"]),
    TypeDescriptor::new(
        "Compute",
        &[
            "ebs_root_volume_size",
            "availability_zones",
            "bootstrap_actions",
            "steps",
            "instance_groups",
            "configurations",
            "emr_managed_master_security_group",
            "emr_managed_slave_security_group",
            "additional_master_security_groups",
            "additional_slave_security_groups",
            "service_access_security_group",
            "custom_ami_id",
            "repo_upgrade_on_boot",
            "ec2_key_name",
            "applications",
        ],
    ),
    TypeDescriptor::new("AvailabilityZone", &["name", "subnet_id"]),
    TypeDescriptor::new("BootstrapActions", &["file"]),
    TypeDescriptor::new("Steps", &["file"]),
    TypeDescriptor::new("Configurations", &["file"]),
    TypeDescriptor::new("File", &["bucket", "key"]),
    TypeDescriptor::new("Application", &["name", "args", "version"]),
    TypeDescriptor::new("InstanceGroups", &["master_group", "core_group", "task_group"]),
    TypeDescriptor::new(
        "MasterGroup",
        &["instance_types", "target", "life_cycle", "configurations"],
    ),
    TypeDescriptor::new(
        "CoreGroup",
        &[
            "instance_types",
            "target",
            "capacity",
            "life_cycle",
            "ebs_configuration",
            "configurations",
        ],
    ),
    TypeDescriptor::new(
        "TaskGroup",
        &[
            "instance_types",
            "capacity",
            "life_cycle",
            "ebs_configuration",
            "configurations",
        ],
    ),
    TypeDescriptor::new("Capacity", &["target", "minimum", "maximum"]),
    TypeDescriptor::new(
        "EbsConfiguration",
        &["ebs_block_device_configs", "ebs_optimized"],
    ),
    TypeDescriptor::new(
        "EbsBlockDeviceConfig",
        &["volume_specification", "volumes_per_instance"],
    ),
    TypeDescriptor::new("VolumeSpecification", &["volume_type", "size_in_gb", "iops"]),
    TypeDescriptor::new(
        "Cluster",
        &[
            "visible_to_all_users",
            "termination_protected",
            "keep_job_flow_alive_when_no_steps",
            "log_uri",
            "additional_info",
            "job_flow_role",
            "security_configuration",
        ],
    ),
    TypeDescriptor::new("Scheduling", &["tasks"]),
    TypeDescriptor::new(
        "Task",
        &[
            "is_enabled",
            "instance_group_type",
            "task_type",
            "cron_expression",
            "target_capacity",
            "min_capacity",
            "max_capacity",
        ],
    ),
    TypeDescriptor::new("Scaling", &["up", "down"]),
    TypeDescriptor::new(
        "Metric",
        &[
            "metric_name",
            "statistic",
            "unit",
            "threshold",
            "adjustment",
            "namespace",
            "period",
            "evaluation_periods",
            "action",
            "cooldown",
            "dimensions",
            "operator",
        ],
    ),
    TypeDescriptor::new(
        "Action",
        &[
            "type",
            "adjustment",
            "min_target_capacity",
            "target",
            "minimum",
            "maximum",
        ],
    ),
    TypeDescriptor::new("Dimension", &["name"]),
];

static OVERRIDES: &[(&str, &str)] = &[
    ("mr_scaler.compute.availability_zones", "AvailabilityZone"),
    ("mr_scaler.compute.applications", "Application"),
    (
        "mr_scaler.compute.instance_groups.core_group.ebs_configuration.ebs_block_device_configs",
        "EbsBlockDeviceConfig",
    ),
    (
        "mr_scaler.compute.instance_groups.task_group.ebs_configuration.ebs_block_device_configs",
        "EbsBlockDeviceConfig",
    ),
    ("mr_scaler.scheduling.tasks", "Task"),
    ("mr_scaler.scaling.up", "Metric"),
    ("mr_scaler.scaling.down", "Metric"),
    ("mr_scaler.scaling.up.dimensions", "Dimension"),
    ("mr_scaler.scaling.down.dimensions", "Dimension"),
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
    use declarative::ExclusionList;
    use modelkit::Model;
    use serde_json::{Value, json};

    fn example() -> Value {
        json!({
            "name": "emr-nightly",
            "region": "us-east-1",
            "strategy": {
                "new": { "release_label": "emr-6.15.0", "number_of_retries": 1 },
                "provisioning_timeout": { "timeout": 15, "timeout_action": "terminateAndRetry" }
            },
            "compute": {
                "availability_zones": [{ "name": "us-east-1a", "subnet_id": "subnet-1" }],
                "bootstrap_actions": { "file": { "bucket": "b", "key": "bootstrap.json" } },
                "applications": [{ "name": "Spark", "version": "3.5" }],
                "instance_groups": {
                    "master_group": { "instance_types": ["m5.xlarge"], "target": 1, "life_cycle": "ON_DEMAND" },
                    "core_group": {
                        "instance_types": ["m5.xlarge"],
                        "capacity": { "target": 2, "minimum": 1, "maximum": 4 },
                        "ebs_configuration": {
                            "ebs_optimized": true,
                            "ebs_block_device_configs": [{
                                "volumes_per_instance": 1,
                                "volume_specification": { "volume_type": "gp3", "size_in_gb": 100 }
                            }]
                        }
                    }
                }
            },
            "cluster": { "termination_protected": false, "log_uri": "s3://logs" },
            "scheduling": { "tasks": [{ "task_type": "setCapacity", "instance_group_type": "task" }] },
            "scaling": {
                "up": [{
                    "metric_name": "YARNMemoryAvailablePercentage",
                    "action": { "type": "adjustment", "adjustment": 1 },
                    "dimensions": [{ "name": "JobFlowId" }]
                }]
            }
        })
    }

    #[test]
    fn test_nested_groups_map() {
        let schema = schema();
        let emr = schema.mapper().map_root(&example()).unwrap();
        assert_eq!(emr.type_name(), "MrScaler");

        let groups = emr
            .lookup("compute.instance_groups")
            .and_then(Model::as_object)
            .unwrap();
        assert_eq!(groups.type_name(), "InstanceGroups");
        assert_eq!(groups.get_object("master_group").unwrap().type_name(), "MasterGroup");

        let core = groups.get_object("core_group").unwrap();
        assert_eq!(core.get_object("capacity").unwrap().type_name(), "Capacity");
        let block = core
            .lookup("ebs_configuration.ebs_block_device_configs")
            .and_then(Model::as_list)
            .unwrap()[0]
            .as_object()
            .unwrap();
        assert_eq!(block.type_name(), "EbsBlockDeviceConfig");
        assert_eq!(
            block.get_object("volume_specification").unwrap().type_name(),
            "VolumeSpecification"
        );

        assert_eq!(
            emr.lookup("compute.bootstrap_actions.file")
                .and_then(Model::as_object)
                .unwrap()
                .type_name(),
            "File"
        );
        assert_eq!(
            emr.lookup("scaling.up").and_then(Model::as_list).unwrap()[0]
                .as_object()
                .unwrap()
                .type_name(),
            "Metric"
        );
        assert_eq!(
            emr.lookup("strategy.provisioning_timeout")
                .and_then(Model::as_object)
                .unwrap()
                .type_name(),
            "ProvisioningTimeout"
        );
    }

    #[test]
    fn test_update_drops_create_only_subtrees() {
        let mut desired = example();
        ExclusionList::new(UPDATE_EXCLUSIONS.iter().copied()).apply(&mut desired);

        let schema = schema();
        let wire = schema.mapper().map_root(&desired).unwrap().to_wire();
        assert!(wire.get("region").is_none());
        assert!(wire.get("strategy").is_none());
        assert!(wire.get("scaling").is_none());
        assert_eq!(
            wire["compute"]["instanceGroups"]["coreGroup"]["capacity"]["target"],
            2
        );
        assert_eq!(wire["cluster"], json!({ "terminationProtected": false }));
        assert_eq!(
            wire["compute"],
            json!({
                "instanceGroups": {
                    "coreGroup": { "capacity": { "target": 2, "minimum": 1, "maximum": 4 } }
                }
            })
        );
    }
}
