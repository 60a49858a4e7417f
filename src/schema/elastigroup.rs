//! Elastigroup types (`aws/ec2/group`)

use modelkit::{OverrideTable, Schema, TypeDescriptor, TypeRegistry};

pub const ROOT: &str = "group";

/// Paths never sent on update
pub const UPDATE_EXCLUSIONS: &[&str] = &["compute.product"];

static TYPES: &[TypeDescriptor] = &[
    TypeDescriptor::new(
        "Group",
        &[
            "name",
            "description",
            "region",
            "capacity",
            "strategy",
            "scaling",
            "compute",
            "third_parties_integration",
            "multai",
            "scheduling",
        ],
    ),
    TypeDescriptor::new("Capacity", &["minimum", "maximum", "target", "unit"]),
    TypeDescriptor::new(
        "Strategy",
        &[
            "risk",
            "on_demand_count",
            "availability_vs_cost",
            "draining_timeout",
            "spin_up_time",
            "lifetime_period",
            "utilize_reserved_instances",
            "fallback_to_od",
            "scaling_strategy",
            "persistence",
            "signals",
        ],
    ),
    TypeDescriptor::new("ScalingStrategy", &["terminate_at_end_of_billing_hour"]),
    TypeDescriptor::new(
        "Persistence",
        &[
            "should_persist_root_device",
            "should_persist_block_devices",
            "should_persist_private_ip",
        ],
    ),
    TypeDescriptor::new("Signal", &["name", "timeout"]),
    TypeDescriptor::new("Scaling", &["up", "down", "target"]),
    TypeDescriptor::new(
        "ScalingPolicy",
        &[
            "policy_name",
            "namespace",
            "source",
            "metric_name",
            "dimensions",
            "statistic",
            "evaluation_periods",
            "period",
            "threshold",
            "cooldown",
            "unit",
            "operator",
            "action",
            "target",
            "predictive",
        ],
    ),
    TypeDescriptor::new("Dimension", &["name", "value"]),
    TypeDescriptor::new(
        "ScalingPolicyAction",
        &[
            "type",
            "adjustment",
            "min_target_capacity",
            "max_target_capacity",
            "target",
            "minimum",
            "maximum",
        ],
    ),
    TypeDescriptor::new("Predictive", &["mode"]),
    TypeDescriptor::new(
        "Compute",
        &[
            "instance_types",
            "availability_zones",
            "product",
            "elastic_ips",
            "ebs_volume_pool",
            "launch_specification",
        ],
    ),
    TypeDescriptor::new("InstanceTypes", &["ondemand", "spot", "preferred_spot"]),
    TypeDescriptor::new(
        "AvailabilityZone",
        &["name", "subnet_id", "subnet_ids", "placement_group_name"],
    ),
    TypeDescriptor::new("EbsVolume", &["device_name", "volume_ids"]),
    TypeDescriptor::new(
        "LaunchSpecification",
        &[
            "security_group_ids",
            "image_id",
            "monitoring",
            "health_check_type",
            "health_check_grace_period",
            "health_check_unhealthy_duration_before_replacement",
            "load_balancers_config",
            "iam_role",
            "key_pair",
            "user_data",
            "shutdown_script",
            "tenancy",
            "ebs_optimized",
            "network_interfaces",
            "block_device_mappings",
            "tags",
        ],
    ),
    TypeDescriptor::new("LoadBalancersConfig", &["load_balancers"]),
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
    TypeDescriptor::new("IamRole", &["name", "arn"]),
    TypeDescriptor::new(
        "NetworkInterface",
        &[
            "description",
            "device_index",
            "secondary_private_ip_address_count",
            "associate_public_ip_address",
            "associate_ipv6_address",
            "delete_on_termination",
            "groups",
            "network_interface_id",
            "private_ip_address",
            "private_ip_addresses",
            "subnet_id",
        ],
    ),
    TypeDescriptor::new("PrivateIpAddress", &["private_ip_address", "primary"]),
    TypeDescriptor::new(
        "BlockDeviceMapping",
        &["device_name", "virtual_name", "no_device", "ebs"],
    ),
    TypeDescriptor::new(
        "Ebs",
        &[
            "delete_on_termination",
            "encrypted",
            "iops",
            "throughput",
            "snapshot_id",
            "volume_type",
            "volume_size",
            "kms_key_id",
        ],
    ),
    TypeDescriptor::new("Tag", &["tag_key", "tag_value"]),
    TypeDescriptor::new(
        "ThirdPartiesIntegration",
        &[
            "rancher",
            "mesosphere",
            "elastic_beanstalk",
            "ecs",
            "kubernetes",
            "right_scale",
            "ops_works",
            "chef",
        ],
    ),
    TypeDescriptor::new("Rancher", &["access_key", "secret_key", "master_host"]),
    TypeDescriptor::new("Mesosphere", &["api_server"]),
    TypeDescriptor::new("ElasticBeanstalk", &["environment_id"]),
    TypeDescriptor::new("EcsConfiguration", &["cluster_name"]),
    TypeDescriptor::new(
        "KubernetesConfiguration",
        &["api_server", "token", "integration_mode", "cluster_identifier"],
    ),
    TypeDescriptor::new("RightScaleConfiguration", &["account_id", "refresh_token"]),
    TypeDescriptor::new("OpsWorksConfiguration", &["layer_id"]),
    TypeDescriptor::new(
        "ChefConfiguration",
        &[
            "chef_server",
            "organization",
            "user",
            "pem_key",
            "chef_version",
        ],
    ),
    TypeDescriptor::new("Multai", &["token", "balancers"]),
    TypeDescriptor::new(
        "MultaiLoadBalancer",
        &[
            "balancer_id",
            "project_id",
            "target_set_id",
            "az_awareness",
            "auto_weight",
        ],
    ),
    TypeDescriptor::new("Scheduling", &["tasks"]),
    TypeDescriptor::new(
        "ScheduledTask",
        &[
            "task_type",
            "is_enabled",
            "cron_expression",
            "frequency",
            "start_time",
            "adjustment",
            "adjustment_percentage",
            "batch_size_percentage",
            "grace_period",
            "scale_target_capacity",
            "scale_min_capacity",
            "scale_max_capacity",
        ],
    ),
];

static OVERRIDES: &[(&str, &str)] = &[
    ("group.strategy.signals", "Signal"),
    ("group.scaling.up", "ScalingPolicy"),
    ("group.scaling.down", "ScalingPolicy"),
    ("group.scaling.target", "ScalingPolicy"),
    ("group.scaling.up.dimensions", "Dimension"),
    ("group.scaling.down.dimensions", "Dimension"),
    ("group.scaling.target.dimensions", "Dimension"),
    ("group.scaling.up.action", "ScalingPolicyAction"),
    ("group.scaling.down.action", "ScalingPolicyAction"),
    ("group.scaling.target.action", "ScalingPolicyAction"),
    ("group.compute.availability_zones", "AvailabilityZone"),
    ("group.compute.ebs_volume_pool", "EbsVolume"),
    ("group.compute.launch_specification.load_balancers_config.load_balancers", "LoadBalancer"),
    ("group.compute.launch_specification.network_interfaces", "NetworkInterface"),
    (
        "group.compute.launch_specification.network_interfaces.private_ip_addresses",
        "PrivateIpAddress",
    ),
    ("group.compute.launch_specification.block_device_mappings", "BlockDeviceMapping"),
    ("group.compute.launch_specification.tags", "Tag"),
    ("group.third_parties_integration.ecs", "EcsConfiguration"),
    ("group.third_parties_integration.kubernetes", "KubernetesConfiguration"),
    ("group.third_parties_integration.right_scale", "RightScaleConfiguration"),
    ("group.third_parties_integration.ops_works", "OpsWorksConfiguration"),
    ("group.third_parties_integration.chef", "ChefConfiguration"),
    ("group.multai.balancers", "MultaiLoadBalancer"),
    ("group.scheduling.tasks", "ScheduledTask"),
];

pub fn schema() -> Schema {
    Schema::new(
        ROOT,
        TypeRegistry::from_descriptors(TYPES),
        OverrideTable::from_pairs(OVERRIDES),
    )
}
