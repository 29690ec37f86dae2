use std::{
    collections::HashMap,
    sync::Arc,
    task::{Context, Poll},
};

use validator::Validate;

use crate::{
    api::{
        internal::ensure_valid_id,
        operations::{self, OperationDescriptor},
        types::*,
        *,
    },
    errors::{ErrorKind, FieldError, LabClientError},
};

/// Account accepted by the `login` mutation of the [`LabTestClient`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestAccount {
    pub username: String,
    pub password: String,
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

/// Represents a state for [`LabTestClient`].
#[derive(Clone, Debug, PartialEq)]
pub struct LabTestState {
    pub devices: Vec<Device>,
    pub device_types: Vec<DeviceType>,
    pub software: Vec<Software>,
    /// Reservation flags by device id. Devices missing here are not reserved.
    pub reservations: HashMap<String, bool>,
    pub script_configs: Vec<ScriptConfig>,
    /// Experiments by their identifier.
    pub experiments: HashMap<String, ExperimentDetail>,
    pub camera: CameraStatus,
    pub video_running: bool,
    pub accounts: Vec<TestAccount>,
    /// Currently logged in account, by username.
    pub session: Option<String>,
    /// Counter used to assign identifiers to created entities.
    pub next_id: u64,
}

impl Default for LabTestState {
    fn default() -> Self {
        Self {
            devices: Default::default(),
            device_types: Default::default(),
            software: Default::default(),
            reservations: Default::default(),
            script_configs: Default::default(),
            experiments: Default::default(),
            camera: CameraStatus {
                is_connected: true,
                status: "connected".into(),
            },
            video_running: false,
            accounts: Default::default(),
            session: None,
            next_id: 100,
        }
    }
}

impl LabTestState {
    fn assign_id(&mut self) -> Id {
        let id = Id::new(self.next_id.to_string());
        self.next_id += 1;
        id
    }

    fn device_type(&self, id: &Id) -> Result<DeviceType> {
        self.device_types
            .iter()
            .find(|dt| &dt.id == id)
            .cloned()
            .ok_or_else(|| not_found("device type", id))
    }

    fn software_list(&self, ids: &[Id]) -> Result<Vec<Software>> {
        ids.iter()
            .map(|id| {
                self.software
                    .iter()
                    .find(|sw| &sw.id == id)
                    .cloned()
                    .ok_or_else(|| not_found("software", id))
            })
            .collect()
    }
}

fn not_found(what: &str, id: &Id) -> LabClientError {
    ErrorKind::GraphQLError(vec![FieldError::new(format!("{what} {} not found", id.inner()))]).into()
}

/// Failure injected into a single operation of the [`LabTestClient`].
#[derive(Clone, Debug)]
pub enum InjectedFailure {
    /// The server answers with the given errors and no data.
    GraphQL(Vec<FieldError>),
    /// The request fails before any response is received.
    Transport(String),
}

/// Laboratory client for testing purposes.
///
/// This is useful to simulate the laboratory server in unit tests.
/// The test client gets an initial [state](LabTestState) which mutations then change the same
/// way the server would. Every call yields to the executor once before it completes, so callers
/// can interleave other work with an in-flight operation.
///
/// Individual operations can be made to [fail](LabTestClient::fail_operation) and the number of
/// requests issued per operation is [recorded](LabTestClient::request_count).
#[derive(Clone, Default)]
pub struct LabTestClient {
    state: Arc<parking_lot::RwLock<LabTestState>>,
    failures: Arc<parking_lot::RwLock<HashMap<&'static str, InjectedFailure>>>,
    requests: Arc<parking_lot::RwLock<HashMap<&'static str, usize>>>,
    tokens_seen: Arc<parking_lot::RwLock<Vec<Option<String>>>>,
    access_token: Arc<parking_lot::RwLock<Option<String>>>,
}

impl LabTestClient {
    /// Constructs a new client that owns the given [`initial_state`](LabTestState).
    pub fn new(initial_state: LabTestState) -> Self {
        Self {
            state: Arc::new(parking_lot::RwLock::new(initial_state)),
            ..Default::default()
        }
    }

    /// Makes every subsequent call of the given operation fail.
    pub fn fail_operation(&self, op: &'static OperationDescriptor, failure: InjectedFailure) {
        self.failures.write().insert(op.name, failure);
    }

    /// Removes a failure injected by [`fail_operation`](LabTestClient::fail_operation).
    pub fn clear_failure(&self, op: &'static OperationDescriptor) {
        self.failures.write().remove(op.name);
    }

    /// Number of requests issued for the given operation so far.
    pub fn request_count(&self, op: &'static OperationDescriptor) -> usize {
        self.requests.read().get(op.name).copied().unwrap_or_default()
    }

    /// Total number of requests issued so far.
    pub fn total_requests(&self) -> usize {
        self.requests.read().values().sum()
    }

    /// Bearer tokens attached to all requests so far, in order.
    pub fn tokens_seen(&self) -> Vec<Option<String>> {
        self.tokens_seen.read().clone()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LabTestState {
        self.state.read().clone()
    }

    /// Changes the current state in place.
    pub fn update_state<F: FnOnce(&mut LabTestState)>(&self, f: F) {
        f(&mut self.state.write())
    }

    async fn request(&self, op: &'static OperationDescriptor) -> Result<()> {
        *self.requests.write().entry(op.name).or_default() += 1;
        self.tokens_seen.write().push(self.access_token.read().clone());
        tracing::debug!(operation = op.name, "test client request");

        yield_now().await;

        let failure = self.failures.read().get(op.name).cloned();
        match failure {
            Some(InjectedFailure::GraphQL(errors)) => Err(ErrorKind::GraphQLError(errors).into()),
            Some(InjectedFailure::Transport(msg)) => Err(ErrorKind::MockClientError(msg).into()),
            None => Ok(()),
        }
    }
}

async fn yield_now() {
    let mut yielded = false;
    futures::future::poll_fn(|cx: &mut Context<'_>| {
        if yielded {
            Poll::Ready(())
        } else {
            yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    })
    .await
}

#[async_trait::async_trait]
impl LabQueryClient for LabTestClient {
    async fn query_devices(&self) -> Result<Vec<Device>> {
        self.request(&operations::GET_DEVICES).await?;
        Ok(self.state.read().devices.clone())
    }

    async fn query_device(&self, id: &Id) -> Result<Device> {
        self.request(&operations::GET_DEVICE).await?;
        self.state
            .read()
            .devices
            .iter()
            .find(|d| &d.id == id)
            .cloned()
            .ok_or_else(|| not_found("device", id))
    }

    async fn query_device_reservation(&self, id: &Id) -> Result<DeviceReservation> {
        self.request(&operations::GET_DEVICE_RESERVATION).await?;
        let state = self.state.read();
        if !state.devices.iter().any(|d| &d.id == id) {
            return Err(not_found("device", id));
        }
        Ok(DeviceReservation {
            id: id.clone(),
            is_reserved: state.reservations.get(id.inner()).copied().unwrap_or_default(),
        })
    }

    async fn query_device_types(&self) -> Result<Vec<DeviceType>> {
        self.request(&operations::GET_DEVICE_TYPES).await?;
        Ok(self.state.read().device_types.clone())
    }

    async fn query_software(&self) -> Result<Vec<Software>> {
        self.request(&operations::GET_SOFTWARE).await?;
        Ok(self.state.read().software.clone())
    }

    async fn query_script_config(&self, _selector: ScriptConfigInput) -> Result<Vec<ScriptConfig>> {
        self.request(&operations::GET_SCRIPT_CONFIG).await?;
        Ok(self.state.read().script_configs.clone())
    }

    async fn query_experiment_details(&self, experiment_id: &Id) -> Result<Option<ExperimentDetail>> {
        self.request(&operations::GET_EXPERIMENT_DETAILS).await?;
        Ok(self.state.read().experiments.get(experiment_id.inner()).cloned())
    }

    async fn query_camera_status(&self) -> Result<CameraStatus> {
        self.request(&operations::GET_CAMERA_STATUS).await?;
        Ok(self.state.read().camera.clone())
    }

    async fn query_video_stream_status(&self) -> Result<VideoStreamStatus> {
        self.request(&operations::GET_VIDEO_STREAM_STATUS).await?;
        let running = self.state.read().video_running;
        Ok(VideoStreamStatus {
            is_running: running,
            status: Some(if running { "running" } else { "stopped" }.into()),
        })
    }

    async fn query_me(&self) -> Result<Option<User>> {
        self.request(&operations::GET_ME).await?;
        let token = self.access_token.read().clone();
        let state = self.state.read();
        Ok(token.and_then(|token| {
            state
                .accounts
                .iter()
                .find(|acc| acc.access_token == token)
                .map(|acc| acc.user.clone())
        }))
    }

    async fn query_user(&self, id: &Id) -> Result<Option<User>> {
        ensure_valid_id(id)?;
        self.request(&operations::GET_USER).await?;
        Ok(self
            .state
            .read()
            .accounts
            .iter()
            .find(|acc| acc.user.id.as_ref() == Some(id))
            .map(|acc| acc.user.clone()))
    }
}

#[async_trait::async_trait]
impl LabMutationClient for LabTestClient {
    async fn create_device(&self, input: CreateDeviceInput) -> Result<Device> {
        input.validate()?;
        self.request(&operations::CREATE_DEVICE).await?;

        let mut state = self.state.write();
        let device = Device {
            id: state.assign_id(),
            name: input.name,
            port: input.port,
            device_type: state.device_type(&input.device_type_id)?,
            software: state.software_list(&input.software)?,
        };
        state.devices.push(device.clone());
        Ok(device)
    }

    async fn update_device(&self, input: UpdateDeviceInput) -> Result<Device> {
        input.validate()?;
        self.request(&operations::UPDATE_DEVICE).await?;

        let mut state = self.state.write();
        let device_type = state.device_type(&input.device_type)?;
        let software = state.software_list(&input.software)?;
        let device = state
            .devices
            .iter_mut()
            .find(|d| d.id == input.id)
            .ok_or_else(|| not_found("device", &input.id))?;

        device.name = input.name;
        device.port = input.port;
        device.device_type = device_type;
        device.software = software;
        Ok(device.clone())
    }

    async fn remove_device(&self, id: &Id) -> Result<Device> {
        ensure_valid_id(id)?;
        self.request(&operations::REMOVE_DEVICE).await?;

        let mut state = self.state.write();
        let pos = state
            .devices
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| not_found("device", id))?;
        state.reservations.remove(id.inner());
        Ok(state.devices.remove(pos))
    }

    async fn update_device_reservation(&self, input: DeviceReservationInput) -> Result<u32> {
        input.validate()?;
        self.request(&operations::UPDATE_DEVICE_RESERVATION).await?;

        let mut state = self.state.write();
        if !state.devices.iter().any(|d| d.id == input.device_id) {
            return Ok(0);
        }
        state
            .reservations
            .insert(input.device_id.into_inner(), input.is_reserved);
        Ok(1)
    }

    async fn create_software(&self, input: CreateSoftwareInput) -> Result<Software> {
        input.validate()?;
        self.request(&operations::CREATE_SOFTWARE).await?;

        let mut state = self.state.write();
        let software = Software {
            id: state.assign_id(),
            name: input.name,
        };
        state.software.push(software.clone());
        Ok(software)
    }

    async fn update_software(&self, input: UpdateSoftwareInput) -> Result<Software> {
        input.validate()?;
        self.request(&operations::UPDATE_SOFTWARE).await?;

        let mut state = self.state.write();
        let software = state
            .software
            .iter_mut()
            .find(|sw| sw.id == input.id)
            .ok_or_else(|| not_found("software", &input.id))?;
        software.name = input.name;
        let updated = software.clone();

        for device in state.devices.iter_mut() {
            for installed in device.software.iter_mut().filter(|sw| sw.id == updated.id) {
                *installed = updated.clone();
            }
        }
        Ok(updated)
    }

    async fn remove_software(&self, id: &Id) -> Result<Software> {
        ensure_valid_id(id)?;
        self.request(&operations::REMOVE_SOFTWARE).await?;

        let mut state = self.state.write();
        if state.devices.iter().any(|d| d.software.iter().any(|sw| &sw.id == id)) {
            return Err(ErrorKind::GraphQLError(vec![FieldError::new("in use").with_path(["removeSoftware"])]).into());
        }
        let pos = state
            .software
            .iter()
            .position(|sw| &sw.id == id)
            .ok_or_else(|| not_found("software", id))?;
        Ok(state.software.remove(pos))
    }

    async fn create_device_type(&self, input: CreateDeviceTypeInput) -> Result<DeviceType> {
        input.validate()?;
        self.request(&operations::CREATE_DEVICE_TYPE).await?;

        let mut state = self.state.write();
        let device_type = DeviceType {
            id: state.assign_id(),
            name: input.name,
        };
        state.device_types.push(device_type.clone());
        Ok(device_type)
    }

    async fn update_device_type(&self, input: UpdateDeviceTypeInput) -> Result<DeviceType> {
        input.validate()?;
        self.request(&operations::UPDATE_DEVICE_TYPE).await?;

        let mut state = self.state.write();
        let device_type = state
            .device_types
            .iter_mut()
            .find(|dt| dt.id == input.id)
            .ok_or_else(|| not_found("device type", &input.id))?;
        device_type.name = input.name;
        let updated = device_type.clone();

        for device in state.devices.iter_mut().filter(|d| d.device_type.id == updated.id) {
            device.device_type = updated.clone();
        }
        Ok(updated)
    }

    async fn remove_device_type(&self, id: &Id) -> Result<DeviceType> {
        ensure_valid_id(id)?;
        self.request(&operations::REMOVE_DEVICE_TYPE).await?;

        let mut state = self.state.write();
        if state.devices.iter().any(|d| &d.device_type.id == id) {
            return Err(
                ErrorKind::GraphQLError(vec![FieldError::new("in use").with_path(["removeDeviceType"])]).into(),
            );
        }
        let pos = state
            .device_types
            .iter()
            .position(|dt| &dt.id == id)
            .ok_or_else(|| not_found("device type", id))?;
        Ok(state.device_types.remove(pos))
    }

    async fn start_video_stream(&self) -> Result<VideoStreamStarted> {
        self.request(&operations::START_VIDEO_STREAM).await?;
        self.state.write().video_running = true;
        Ok(VideoStreamStarted { is_running: true })
    }

    async fn stop_video_stream(&self) -> Result<StopVideoStreamStatus> {
        self.request(&operations::STOP_VIDEO_STREAM).await?;
        let mut state = self.state.write();
        let was_running = std::mem::replace(&mut state.video_running, false);
        Ok(StopVideoStreamStatus {
            is_stopped: true,
            status: if was_running { "stopped" } else { "not running" }.into(),
        })
    }
}

fn script_error(message: &str) -> LabClientError {
    ErrorKind::GraphQLError(vec![FieldError::new(message)]).into()
}

#[async_trait::async_trait]
impl LabScriptClient for LabTestClient {
    async fn run_script(&self, input: RunScriptInput) -> Result<ScriptRun> {
        input.validate()?;
        self.request(&operations::RUN_SCRIPT).await?;

        let mut state = self.state.write();
        let device_id = input
            .device
            .as_ref()
            .map(|d| d.device_id.clone())
            .ok_or_else(|| script_error("device is required"))?;
        if !state.devices.iter().any(|d| d.id == device_id) {
            return Err(not_found("device", &device_id));
        }

        let experiment_id = Id::new(format!("exp-{}", state.next_id));
        state.next_id += 1;
        state.experiments.insert(
            experiment_id.inner().to_string(),
            ExperimentDetail {
                url: None,
                status: Some(ExperimentStatus::Running),
                values: Vec::new(),
            },
        );

        Ok(ScriptRun {
            status: Some("running".into()),
            experiment_id,
            error_message: String::new(),
        })
    }

    async fn change_script(&self, input: RunScriptInput) -> Result<ScriptOutput> {
        input.validate()?;
        self.request(&operations::CHANGE_SCRIPT).await?;

        let state = self.state.read();
        let experiment = input
            .experiment_id
            .as_ref()
            .and_then(|id| state.experiments.get(id.inner()))
            .ok_or_else(|| script_error("unknown experiment"))?;

        Ok(ScriptOutput {
            status: experiment.status.map(|s| format!("{s:?}").to_lowercase()),
            error_message: String::new(),
        })
    }

    async fn stop_script(&self, input: RunScriptInput) -> Result<ScriptOutput> {
        input.validate()?;
        self.request(&operations::STOP_SCRIPT).await?;

        let mut state = self.state.write();
        let experiment = input
            .experiment_id
            .as_ref()
            .and_then(|id| state.experiments.get_mut(id.inner()))
            .ok_or_else(|| script_error("unknown experiment"))?;
        experiment.status = Some(ExperimentStatus::Finished);

        Ok(ScriptOutput {
            status: Some("finished".into()),
            error_message: String::new(),
        })
    }
}

#[async_trait::async_trait]
impl LabAuthClient for LabTestClient {
    async fn login(&self, input: LoginInput) -> Result<AuthPayload> {
        input.validate()?;
        self.request(&operations::LOGIN).await?;

        let account = self
            .state
            .read()
            .accounts
            .iter()
            .find(|acc| acc.username == input.username && acc.password == input.password)
            .cloned()
            .ok_or_else(|| script_error("invalid credentials"))?;

        self.state.write().session = Some(account.username.clone());
        self.set_access_token(Some(account.access_token.clone()));
        Ok(AuthPayload {
            access_token: Some(account.access_token),
            refresh_token: Some(account.refresh_token),
            expires_in: Some(3600),
            token_type: Some("Bearer".into()),
            user: Some(account.user),
        })
    }

    async fn social_login(&self, input: SocialLoginInput) -> Result<AuthPayload> {
        input.validate()?;
        self.request(&operations::SOCIAL_LOGIN).await?;

        let account = self
            .state
            .read()
            .accounts
            .iter()
            .find(|acc| acc.access_token == input.token)
            .cloned()
            .ok_or_else(|| script_error("invalid social token"))?;

        self.state.write().session = Some(account.username.clone());
        self.set_access_token(Some(account.access_token.clone()));
        Ok(AuthPayload {
            access_token: Some(account.access_token),
            refresh_token: Some(account.refresh_token),
            expires_in: Some(3600),
            token_type: Some("Bearer".into()),
            user: Some(account.user),
        })
    }

    async fn refresh_token(&self, refresh_token: Option<String>) -> Result<RefreshTokenPayload> {
        self.request(&operations::REFRESH_TOKEN).await?;

        let account = self
            .state
            .read()
            .accounts
            .iter()
            .find(|acc| Some(&acc.refresh_token) == refresh_token.as_ref())
            .cloned()
            .ok_or_else(|| script_error("invalid refresh token"))?;

        self.set_access_token(Some(account.access_token.clone()));
        Ok(RefreshTokenPayload {
            access_token: account.access_token,
            refresh_token: account.refresh_token,
            expires_in: 3600,
            token_type: "Bearer".into(),
        })
    }

    async fn logout(&self) -> Result<LogoutResponse> {
        self.request(&operations::LOGOUT).await?;

        self.state.write().session = None;
        self.set_access_token(None);
        Ok(LogoutResponse {
            status: "LOGGED_OUT".into(),
            message: None,
        })
    }

    fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write() = token;
    }

    fn access_token(&self) -> Option<String> {
        self.access_token.read().clone()
    }
}
