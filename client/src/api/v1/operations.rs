//! Table of all GraphQL operations issued by the dashboard.
//!
//! Each operation is described once: its logical name, whether it is a query or a mutation,
//! which entities it reads and which entities it changes. The client uses the table for
//! logging, the [query cache](crate::orchestration::QueryCache) uses it to decide which cached
//! results a completed mutation makes stale.

/// Kinds of server-side entities that cached results depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Device,
    DeviceReservation,
    DeviceType,
    Software,
    Experiment,
    Media,
    User,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// Describes a single named GraphQL operation.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct OperationDescriptor {
    /// Logical name used in logs and cache keys.
    pub name: &'static str,
    pub kind: OperationKind,
    pub reads: &'static [EntityKind],
    pub invalidates: &'static [EntityKind],
}

impl OperationDescriptor {
    const fn query(name: &'static str, reads: &'static [EntityKind]) -> Self {
        Self {
            name,
            kind: OperationKind::Query,
            reads,
            invalidates: &[],
        }
    }

    const fn mutation(name: &'static str, invalidates: &'static [EntityKind]) -> Self {
        Self {
            name,
            kind: OperationKind::Mutation,
            reads: &[],
            invalidates,
        }
    }

    pub fn is_mutation(&self) -> bool {
        self.kind == OperationKind::Mutation
    }

    /// Indicates whether completing `self` makes results of the `other` operation stale.
    pub fn invalidates_results_of(&self, other: &OperationDescriptor) -> bool {
        other.reads.iter().any(|entity| self.invalidates.contains(entity))
    }
}

use EntityKind::*;

pub static GET_DEVICES: OperationDescriptor = OperationDescriptor::query("getDevices", &[Device, DeviceType, Software]);
pub static GET_DEVICE: OperationDescriptor =
    OperationDescriptor::query("getDeviceByID", &[Device, DeviceType, Software]);
pub static GET_DEVICE_RESERVATION: OperationDescriptor =
    OperationDescriptor::query("getDeviceReservationStatus", &[DeviceReservation]);
pub static GET_SOFTWARE: OperationDescriptor = OperationDescriptor::query("getSoftware", &[Software]);
pub static GET_DEVICE_TYPES: OperationDescriptor = OperationDescriptor::query("getDeviceTypes", &[DeviceType]);
pub static GET_SCRIPT_CONFIG: OperationDescriptor =
    OperationDescriptor::query("getDeviceConfig", &[Device, DeviceType, Software]);
pub static GET_EXPERIMENT_DETAILS: OperationDescriptor =
    OperationDescriptor::query("getExperimentDetails", &[Experiment]);
pub static GET_CAMERA_STATUS: OperationDescriptor = OperationDescriptor::query("getCameraStatus", &[Media]);
pub static GET_VIDEO_STREAM_STATUS: OperationDescriptor = OperationDescriptor::query("getVideoStreamStatus", &[Media]);
pub static GET_ME: OperationDescriptor = OperationDescriptor::query("getMe", &[User]);
pub static GET_USER: OperationDescriptor = OperationDescriptor::query("getUser", &[User]);

pub static CREATE_DEVICE: OperationDescriptor =
    OperationDescriptor::mutation("createDevice", &[Device, DeviceReservation]);
pub static UPDATE_DEVICE: OperationDescriptor =
    OperationDescriptor::mutation("updateDevice", &[Device, DeviceReservation]);
pub static REMOVE_DEVICE: OperationDescriptor =
    OperationDescriptor::mutation("removeDevice", &[Device, DeviceReservation]);
pub static UPDATE_DEVICE_RESERVATION: OperationDescriptor =
    OperationDescriptor::mutation("updateDeviceReservationStatus", &[DeviceReservation]);
pub static CREATE_SOFTWARE: OperationDescriptor = OperationDescriptor::mutation("createSoftware", &[Software]);
pub static UPDATE_SOFTWARE: OperationDescriptor = OperationDescriptor::mutation("updateSoftware", &[Software]);
pub static REMOVE_SOFTWARE: OperationDescriptor = OperationDescriptor::mutation("removeSoftware", &[Software]);
pub static CREATE_DEVICE_TYPE: OperationDescriptor = OperationDescriptor::mutation("createDeviceType", &[DeviceType]);
pub static UPDATE_DEVICE_TYPE: OperationDescriptor = OperationDescriptor::mutation("updateDeviceType", &[DeviceType]);
pub static REMOVE_DEVICE_TYPE: OperationDescriptor = OperationDescriptor::mutation("removeDeviceType", &[DeviceType]);
pub static START_VIDEO_STREAM: OperationDescriptor = OperationDescriptor::mutation("startVideoStream", &[Media]);
pub static STOP_VIDEO_STREAM: OperationDescriptor = OperationDescriptor::mutation("stopVideoStream", &[Media]);
pub static RUN_SCRIPT: OperationDescriptor = OperationDescriptor::mutation("runScript", &[Experiment]);
pub static CHANGE_SCRIPT: OperationDescriptor = OperationDescriptor::mutation("changeScript", &[Experiment]);
pub static STOP_SCRIPT: OperationDescriptor = OperationDescriptor::mutation("stopScript", &[Experiment]);
pub static LOGIN: OperationDescriptor = OperationDescriptor::mutation("login", &[User]);
pub static SOCIAL_LOGIN: OperationDescriptor = OperationDescriptor::mutation("socialLogin", &[User]);
pub static REFRESH_TOKEN: OperationDescriptor = OperationDescriptor::mutation("refreshToken", &[User]);
pub static LOGOUT: OperationDescriptor = OperationDescriptor::mutation("logout", &[User]);

/// All operations known to the client.
pub static ALL_OPERATIONS: [&OperationDescriptor; 30] = [
    &GET_DEVICES,
    &GET_DEVICE,
    &GET_DEVICE_RESERVATION,
    &GET_SOFTWARE,
    &GET_DEVICE_TYPES,
    &GET_SCRIPT_CONFIG,
    &GET_EXPERIMENT_DETAILS,
    &GET_CAMERA_STATUS,
    &GET_VIDEO_STREAM_STATUS,
    &GET_ME,
    &GET_USER,
    &CREATE_DEVICE,
    &UPDATE_DEVICE,
    &REMOVE_DEVICE,
    &UPDATE_DEVICE_RESERVATION,
    &CREATE_SOFTWARE,
    &UPDATE_SOFTWARE,
    &REMOVE_SOFTWARE,
    &CREATE_DEVICE_TYPE,
    &UPDATE_DEVICE_TYPE,
    &REMOVE_DEVICE_TYPE,
    &START_VIDEO_STREAM,
    &STOP_VIDEO_STREAM,
    &RUN_SCRIPT,
    &CHANGE_SCRIPT,
    &STOP_SCRIPT,
    &LOGIN,
    &SOCIAL_LOGIN,
    &REFRESH_TOKEN,
    &LOGOUT,
];

/// Looks up an operation by its logical name.
///
/// The logical name keys logs and the query cache. It is not the `operationName` sent on the
/// wire, which cynic derives from the fragment type (e.g. `QueryDevices`).
pub fn find_operation(name: &str) -> Option<&'static OperationDescriptor> {
    ALL_OPERATIONS.iter().copied().find(|op| op.name == name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn operation_names_are_unique() {
        let names = ALL_OPERATIONS.iter().map(|op| op.name).collect::<HashSet<_>>();
        assert_eq!(names.len(), ALL_OPERATIONS.len());
    }

    #[test]
    fn queries_never_invalidate_and_mutations_never_read() {
        for op in ALL_OPERATIONS.iter() {
            match op.kind {
                OperationKind::Query => assert!(op.invalidates.is_empty(), "{} invalidates", op.name),
                OperationKind::Mutation => assert!(op.reads.is_empty(), "{} reads", op.name),
            }
        }
    }

    #[test]
    fn software_removal_makes_device_list_stale() {
        assert!(REMOVE_SOFTWARE.invalidates_results_of(&GET_SOFTWARE));
        assert!(REMOVE_SOFTWARE.invalidates_results_of(&GET_DEVICES));
        assert!(!REMOVE_SOFTWARE.invalidates_results_of(&GET_DEVICE_TYPES));
        assert!(!RUN_SCRIPT.invalidates_results_of(&GET_DEVICES));
    }

    #[test]
    fn reservation_update_does_not_touch_device_list() {
        assert!(UPDATE_DEVICE_RESERVATION.invalidates_results_of(&GET_DEVICE_RESERVATION));
        assert!(!UPDATE_DEVICE_RESERVATION.invalidates_results_of(&GET_DEVICES));
    }

    #[test]
    fn operations_are_found_by_logical_name() {
        assert_eq!(find_operation("removeSoftware"), Some(&REMOVE_SOFTWARE));
        assert_eq!(find_operation("nonexistent"), None);
    }
}
