// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Uniform access to status conditions of typed Cluster API resources and of
//! dynamically-typed provider objects. Conditions are read in the v1beta2
//! shape; the `severity` of older conditions is not interpreted.

use kube::api::DynamicObject;
use serde_json::{json, Value};
use tracing::debug;

use crate::constants::conditions::{AVAILABLE, READY, UP_TO_DATE};
use crate::types::{
    Cluster, ClusterResourceSet, Condition, Machine, MachineDeployment, MachinePool, MachineSet,
};

/// Read/write access to the `status.conditions` of an object
pub trait ConditionAccessor {
    /// All conditions of the object, `None` if absent or unreadable
    fn conditions(&self) -> Option<Vec<Condition>>;

    fn set_conditions(&mut self, conditions: Vec<Condition>);

    /// Machine-only conditions are read only when this is true
    fn is_machine(&self) -> bool {
        false
    }
}

macro_rules! typed_condition_accessor {
    ($($kind:ty),* $(,)?) => {
        $(
            impl ConditionAccessor for $kind {
                fn conditions(&self) -> Option<Vec<Condition>> {
                    self.status.as_ref().and_then(|s| s.conditions.clone())
                }

                fn set_conditions(&mut self, conditions: Vec<Condition>) {
                    self.status.get_or_insert_with(Default::default).conditions = Some(conditions);
                }
            }
        )*
    };
}

typed_condition_accessor!(Cluster, MachineSet, MachineDeployment, MachinePool, ClusterResourceSet);

impl ConditionAccessor for Machine {
    fn conditions(&self) -> Option<Vec<Condition>> {
        self.status.as_ref().and_then(|s| s.conditions.clone())
    }

    fn set_conditions(&mut self, conditions: Vec<Condition>) {
        self.status.get_or_insert_with(Default::default).conditions = Some(conditions);
    }

    fn is_machine(&self) -> bool {
        true
    }
}

impl ConditionAccessor for DynamicObject {
    fn conditions(&self) -> Option<Vec<Condition>> {
        let raw = self.data.pointer("/status/conditions")?;
        match serde_json::from_value(raw.clone()) {
            Ok(conditions) => Some(conditions),
            Err(e) => {
                debug!("Ignoring unreadable conditions: {}", e);
                None
            }
        }
    }

    fn set_conditions(&mut self, conditions: Vec<Condition>) {
        let Ok(conditions) = serde_json::to_value(conditions) else {
            return;
        };

        if !self.data.is_object() {
            self.data = json!({});
        }
        let Some(data) = self.data.as_object_mut() else {
            return;
        };
        let status = data.entry("status").or_insert_with(|| json!({}));
        if !status.is_object() {
            *status = json!({});
        }
        if let Value::Object(status) = status {
            status.insert("conditions".to_string(), conditions);
        }
    }

    fn is_machine(&self) -> bool {
        self.types.as_ref().is_some_and(|t| t.kind == "Machine")
    }
}

fn get_condition<T: ConditionAccessor + ?Sized>(obj: &T, condition_type: &str) -> Option<Condition> {
    obj.conditions()?
        .into_iter()
        .find(|c| c.condition_type == condition_type)
}

fn set_condition<T: ConditionAccessor + ?Sized>(obj: &mut T, condition: Condition) {
    let mut conditions = obj.conditions().unwrap_or_default();
    match conditions
        .iter_mut()
        .find(|c| c.condition_type == condition.condition_type)
    {
        Some(existing) => *existing = condition,
        None => conditions.push(condition),
    }
    obj.set_conditions(conditions);
}

/// Get the Ready condition of an object, if defined
pub fn get_ready<T: ConditionAccessor + ?Sized>(obj: &T) -> Option<Condition> {
    get_condition(obj, READY)
}

/// Get the Available condition of an object, if defined
pub fn get_available<T: ConditionAccessor + ?Sized>(obj: &T) -> Option<Condition> {
    get_condition(obj, AVAILABLE)
}

/// Get the UpToDate condition of a Machine; always `None` for other kinds
pub fn get_machine_up_to_date<T: ConditionAccessor + ?Sized>(obj: &T) -> Option<Condition> {
    if !obj.is_machine() {
        return None;
    }
    get_condition(obj, UP_TO_DATE)
}

/// Get all conditions except Ready, sorted by type
pub fn get_other_conditions<T: ConditionAccessor + ?Sized>(obj: &T) -> Vec<Condition> {
    let mut conditions: Vec<Condition> = obj
        .conditions()
        .unwrap_or_default()
        .into_iter()
        .filter(|c| c.condition_type != READY)
        .collect();
    conditions.sort_by(|a, b| a.condition_type.cmp(&b.condition_type));
    conditions
}

pub fn set_ready<T: ConditionAccessor + ?Sized>(obj: &mut T, mut ready: Condition) {
    ready.condition_type = READY.to_string();
    set_condition(obj, ready);
}

pub fn set_available<T: ConditionAccessor + ?Sized>(obj: &mut T, mut available: Condition) {
    available.condition_type = AVAILABLE.to_string();
    set_condition(obj, available);
}

/// Set the UpToDate condition of a Machine; a no-op for other kinds
pub fn set_machine_up_to_date<T: ConditionAccessor + ?Sized>(obj: &mut T, mut up_to_date: Condition) {
    if !obj.is_machine() {
        return;
    }
    up_to_date.condition_type = UP_TO_DATE.to_string();
    set_condition(obj, up_to_date);
}
