//! `spotctl mr-scaler`

use anyhow::Result;
use declarative::{RemoteCollection, reconcile};
use serde_json::Value;
use spotkit::resources::{Collection, MR_SCALER};

use super::{CommandResult, build_request, connect, desired_tree, overrides};
use crate::Context;
use crate::cli::ReconcileArgs;
use crate::config::{self, InvocationParams};
use crate::schema::mr_scaler::{ROOT, UPDATE_EXCLUSIONS, schema};
use crate::ui;

pub const ID_FIELD: &str = "mr_scaler_id";

pub fn run(ctx: &Context, args: ReconcileArgs) -> Result<()> {
    let document = config::load_document(&args.file)?;
    let params = config::params::<InvocationParams>(&document)?.with_overrides(overrides(&args));
    let client = connect(ctx, params.credentials.clone())?;

    let result = execute(&document, &params, &Collection::new(&client, &MR_SCALER))?;
    ui::render(&result, ctx.output)
}

pub fn execute<C>(document: &Value, params: &InvocationParams, collection: &C) -> Result<CommandResult>
where
    C: RemoteCollection + ?Sized,
{
    let desired = desired_tree(document, ROOT, params.state)?;
    let request = build_request(params, UPDATE_EXCLUSIONS);
    let outcome = reconcile(&desired, &request, &schema(), collection)?;
    Ok(CommandResult::from_outcome(outcome, ID_FIELD))
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::mock::{Call, MockCollection, MockError};
    use declarative::{DesiredState, RemoteResource};
    use serde_json::json;

    fn document() -> Value {
        json!({
            "mr_scaler": {
                "name": "emr-nightly",
                "region": "us-east-1",
                "strategy": { "new": { "release_label": "emr-6.15.0" } },
                "compute": {
                    "instance_groups": {
                        "task_group": { "capacity": { "target": 4, "minimum": 0, "maximum": 8 } }
                    }
                }
            }
        })
    }

    #[test]
    fn test_update_keeps_only_updatable_fields() {
        let mock = MockCollection::new("mr scaler");
        mock.add_resource(RemoteResource::new("simrs-1", "emr-nightly"));

        let result = execute(&document(), &InvocationParams::default(), &mock).unwrap();
        assert_eq!(result.get(ID_FIELD), Some(&json!("simrs-1")));

        let Call::Update(_, wire) = &mock.calls()[1] else {
            panic!("expected update, got {:?}", mock.calls());
        };
        assert_eq!(
            wire,
            &json!({
                "name": "emr-nightly",
                "compute": {
                    "instanceGroups": {
                        "taskGroup": { "capacity": { "target": 4, "minimum": 0, "maximum": 8 } }
                    }
                }
            })
        );
    }

    #[test]
    fn test_update_sends_only_capacity_and_termination_protection() {
        let mock = MockCollection::new("mr scaler");
        mock.add_resource(RemoteResource::new("simrs-1", "emr-nightly"));
        let document = json!({
            "mr_scaler": {
                "name": "emr-nightly",
                "description": "nightly batch",
                "compute": {
                    "availability_zones": [{ "name": "us-east-1a", "subnet_id": "subnet-1" }],
                    "ec2_key_name": "kp",
                    "custom_ami_id": "ami-1",
                    "steps": { "file": { "bucket": "b", "key": "steps.json" } },
                    "instance_groups": {
                        "master_group": { "instance_types": ["m5.xlarge"], "target": 1 },
                        "core_group": {
                            "instance_types": ["m5.xlarge"],
                            "target": 2,
                            "life_cycle": "SPOT",
                            "capacity": { "target": 2, "minimum": 1, "maximum": 4 }
                        },
                        "task_group": {
                            "instance_types": ["m5.large"],
                            "capacity": { "target": 0, "minimum": 0, "maximum": 8 }
                        }
                    }
                },
                "cluster": {
                    "log_uri": "s3://logs",
                    "job_flow_role": "EMR_EC2_DefaultRole",
                    "termination_protected": true
                }
            }
        });

        execute(&document, &InvocationParams::default(), &mock).unwrap();

        let Call::Update(_, wire) = &mock.calls()[1] else {
            panic!("expected update, got {:?}", mock.calls());
        };
        assert_eq!(
            wire,
            &json!({
                "name": "emr-nightly",
                "description": "nightly batch",
                "compute": {
                    "instanceGroups": {
                        "coreGroup": { "capacity": { "target": 2, "minimum": 1, "maximum": 4 } },
                        "taskGroup": { "capacity": { "target": 0, "minimum": 0, "maximum": 8 } }
                    }
                },
                "cluster": { "terminationProtected": true }
            })
        );
    }

    #[test]
    fn test_ambiguous_name_is_fatal() {
        let mock = MockCollection::new("mr scaler");
        mock.add_resource(RemoteResource::new("simrs-1", "emr-nightly"));
        mock.add_resource(RemoteResource::new("simrs-2", "emr-nightly"));

        let err = execute(&document(), &InvocationParams::default(), &mock).unwrap_err();
        assert!(err.to_string().contains("there are 2 mr scalers named 'emr-nightly'"));
        assert!(!mock.mutated());
    }

    #[test]
    fn test_delete_of_missing_cluster_is_noop() {
        let mock = MockCollection::new("mr scaler");
        mock.add_resource(RemoteResource::new("simrs-1", "emr-nightly"));
        mock.fail_on("delete", MockError::not_found("CLUSTER_DOES_NOT_EXIST"));
        let params = InvocationParams {
            state: DesiredState::Absent,
            ..Default::default()
        };

        let result = execute(&document(), &params, &mock).unwrap();
        assert!(!result.changed);
        assert!(result.message.contains("doesn't exist"));
    }
}
