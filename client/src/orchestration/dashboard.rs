use crate::{
    api::{
        LabMutationClient, LabQueryClient, LabScriptClient, operations,
        types::{
            CameraStatus, Device, DeviceConfigInput, ExperimentDetail, Id, RunScriptInput, ScriptConfig,
            ScriptConfigInput, ScriptName, ScriptOutput, ScriptRun, VideoStreamStatus,
        },
    },
    errors::{ErrorKind, LabClientError, SharedError},
    orchestration::{
        ActionResult, ActionState,
        cache::{CacheKey, QueryCache},
        devices::{DeviceRow, fetch_devices, load_devices},
        state::{ActionSlot, Mount},
    },
};

/// Result of a script command submitted from the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// A new run was started.
    Started(ScriptRun),
    /// The running experiment accepted changed parameters.
    Changed(ScriptOutput),
    /// The running experiment was stopped or updated.
    Stopped(ScriptOutput),
}

/// Experiment identifier retained between the script commands of a single run.
///
/// It is set by a successful `start`/`startLocal`, required by `change`, `stop` and `update`,
/// and cleared by a successful `stop`.
#[derive(Debug, Default)]
pub struct ExperimentRun {
    experiment_id: parking_lot::RwLock<Option<Id>>,
}

impl ExperimentRun {
    pub fn experiment_id(&self) -> Option<Id> {
        self.experiment_id.read().clone()
    }

    pub fn is_active(&self) -> bool {
        self.experiment_id.read().is_some()
    }

    fn retain(&self, id: Id) {
        *self.experiment_id.write() = Some(id);
    }

    fn clear(&self) {
        *self.experiment_id.write() = None;
    }

    fn require(&self) -> Result<Id, LabClientError> {
        self.experiment_id()
            .ok_or_else(|| ErrorKind::PreconditionError("no experiment has been started").into())
    }

    /// Builds the mutation input for the given command.
    ///
    /// Parameters are passed to the script as a JSON document.
    pub fn input_for(
        &self,
        command: ScriptName,
        device: DeviceConfigInput,
        parameters: &serde_json::Value,
    ) -> Result<RunScriptInput, LabClientError> {
        let input_parameter = Some(serde_json::to_string(parameters)?);
        match command {
            ScriptName::Start | ScriptName::StartLocal => Ok(RunScriptInput {
                device: Some(device),
                experiment_id: None,
                file_name: Some(String::new()),
                input_parameter,
                script_name: Some(command.as_str().to_string()),
            }),
            ScriptName::Change | ScriptName::Stop | ScriptName::Update => Ok(RunScriptInput {
                device: Some(device),
                experiment_id: Some(self.require()?),
                file_name: None,
                input_parameter,
                script_name: Some(command.as_str().to_string()),
            }),
        }
    }
}

/// Device selection for script commands.
pub fn device_config(device: &Device, software: Option<&str>) -> DeviceConfigInput {
    DeviceConfigInput {
        device_id: device.id.clone(),
        device_name: Some(device.device_type.name.clone()),
        software: software.map(str::to_string),
    }
}

/// Experiment dashboard: device selection, script form, script commands, measured data and video.
pub struct DashboardScreen<C> {
    client: C,
    cache: QueryCache,
    mount: Mount,
    run: ExperimentRun,
    devices: ActionSlot<Vec<Device>>,
    config: ActionSlot<Vec<ScriptConfig>>,
    script: ActionSlot<ScriptOutcome>,
    experiment: ActionSlot<Option<ExperimentDetail>>,
    camera: ActionSlot<CameraStatus>,
    video: ActionSlot<VideoStreamStatus>,
}

impl<C> DashboardScreen<C>
where
    C: LabQueryClient + LabMutationClient + LabScriptClient + Send + Sync,
{
    pub fn new(client: C, cache: QueryCache) -> Self {
        Self {
            client,
            cache,
            mount: Mount::default(),
            run: ExperimentRun::default(),
            devices: ActionSlot::new("dashboard.devices"),
            config: ActionSlot::new("dashboard.config"),
            script: ActionSlot::new("dashboard.script"),
            experiment: ActionSlot::new("dashboard.experiment"),
            camera: ActionSlot::new("dashboard.camera"),
            video: ActionSlot::new("dashboard.video"),
        }
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Returns all action states to `Idle`. The experiment run is kept.
    pub fn reset(&self) {
        self.devices.reset();
        self.config.reset();
        self.script.reset();
        self.experiment.reset();
        self.camera.reset();
        self.video.reset();
    }

    /// Experiment run of this dashboard.
    pub fn run(&self) -> &ExperimentRun {
        &self.run
    }

    pub async fn load(&self) -> ActionResult<Vec<Device>> {
        load_devices(&self.client, &self.cache, &self.devices, &self.mount).await
    }

    pub async fn refresh(&self) -> ActionResult<Vec<Device>> {
        fetch_devices(&self.client, &self.cache, &self.devices, &self.mount).await
    }

    /// Loads the experiment form for the selected device and software.
    pub async fn script_config(&self, selector: ScriptConfigInput) -> ActionResult<Vec<ScriptConfig>> {
        let key = CacheKey::with_variables(&operations::GET_SCRIPT_CONFIG, &selector);
        if let Some(config) = key.as_ref().and_then(|key| self.cache.get::<Vec<ScriptConfig>>(key)) {
            self.config.set(&self.mount, ActionState::Success(config.clone()));
            return Ok(config);
        }

        self.config
            .run(&self.mount, async {
                let config = self.client.query_script_config(selector).await?;
                if let Some(key) = key {
                    self.cache.insert(key, config.clone());
                }
                Ok(config)
            })
            .await
    }

    /// Submits a script command for the given device.
    ///
    /// `start` and `startLocal` begin a new run and retain its experiment identifier. `change`,
    /// `stop` and `update` act on the retained run and fail with a precondition error, without
    /// sending anything, when there is none.
    pub async fn submit(
        &self,
        command: ScriptName,
        device: DeviceConfigInput,
        parameters: serde_json::Value,
    ) -> ActionResult<ScriptOutcome> {
        let input = match self.run.input_for(command, device, &parameters) {
            Ok(input) => input,
            Err(error) => {
                tracing::warn!(%command, %error, "script command rejected");
                return Err(self.script.fail(&self.mount, error));
            }
        };

        self.script
            .run(&self.mount, async {
                match command {
                    ScriptName::Start | ScriptName::StartLocal => {
                        let started = self.client.run_script(input).await?;
                        self.cache.invalidate(&operations::RUN_SCRIPT);
                        if self.mount.is_mounted() {
                            self.run.retain(started.experiment_id.clone());
                        } else {
                            tracing::warn!(
                                experiment = %started.experiment_id.inner(),
                                "experiment started after the dashboard was closed"
                            );
                        }
                        tracing::info!(experiment = %started.experiment_id.inner(), %command, "experiment started");
                        Ok(ScriptOutcome::Started(started))
                    }
                    ScriptName::Change => {
                        let output = self.client.change_script(input).await?;
                        self.cache.invalidate(&operations::CHANGE_SCRIPT);
                        Ok(ScriptOutcome::Changed(output))
                    }
                    ScriptName::Stop | ScriptName::Update => {
                        let output = self.client.stop_script(input).await?;
                        self.cache.invalidate(&operations::STOP_SCRIPT);
                        if command == ScriptName::Stop && self.mount.is_mounted() {
                            self.run.clear();
                            tracing::info!("experiment stopped");
                        }
                        Ok(ScriptOutcome::Stopped(output))
                    }
                }
            })
            .await
    }

    /// Fetches the current state and measured data of the retained experiment.
    pub async fn experiment_details(&self) -> ActionResult<Option<ExperimentDetail>> {
        let experiment_id = match self.run.require() {
            Ok(id) => id,
            Err(error) => return Err(self.experiment.fail(&self.mount, error)),
        };

        self.experiment
            .run(&self.mount, async { self.client.query_experiment_details(&experiment_id).await })
            .await
    }

    pub async fn camera_status(&self) -> ActionResult<CameraStatus> {
        self.camera
            .run(&self.mount, async { self.client.query_camera_status().await })
            .await
    }

    pub async fn video_stream_status(&self) -> ActionResult<VideoStreamStatus> {
        self.video
            .run(&self.mount, async { self.client.query_video_stream_status().await })
            .await
    }

    pub async fn start_video_stream(&self) -> ActionResult<VideoStreamStatus> {
        self.video
            .run(&self.mount, async {
                let started = self.client.start_video_stream().await?;
                self.cache.invalidate(&operations::START_VIDEO_STREAM);
                Ok(VideoStreamStatus {
                    is_running: started.is_running,
                    status: None,
                })
            })
            .await
    }

    pub async fn stop_video_stream(&self) -> ActionResult<VideoStreamStatus> {
        self.video
            .run(&self.mount, async {
                let stopped = self.client.stop_video_stream().await?;
                self.cache.invalidate(&operations::STOP_VIDEO_STREAM);
                Ok(VideoStreamStatus {
                    is_running: !stopped.is_stopped,
                    status: Some(stopped.status),
                })
            })
            .await
    }

    pub fn devices_state(&self) -> ActionState<Vec<Device>> {
        self.devices.get()
    }

    pub fn config_state(&self) -> ActionState<Vec<ScriptConfig>> {
        self.config.get()
    }

    pub fn script_state(&self) -> ActionState<ScriptOutcome> {
        self.script.get()
    }

    pub fn experiment_state(&self) -> ActionState<Option<ExperimentDetail>> {
        self.experiment.get()
    }

    pub fn camera_state(&self) -> ActionState<CameraStatus> {
        self.camera.get()
    }

    pub fn video_state(&self) -> ActionState<VideoStreamStatus> {
        self.video.get()
    }

    pub fn view(&self) -> DashboardView {
        let devices = self.devices.get();
        let script = self.script.get();
        let experiment = self.experiment.get();

        DashboardView {
            devices: self
                .cache
                .get::<Vec<Device>>(&CacheKey::new(&operations::GET_DEVICES))
                .or_else(|| devices.value().cloned())
                .unwrap_or_default()
                .iter()
                .map(DeviceRow::from)
                .collect(),
            experiment_id: self.run.experiment_id(),
            experiment: experiment.value().cloned().flatten(),
            script_pending: script.is_pending(),
            error: script
                .error()
                .or(experiment.error())
                .or(devices.error())
                .cloned(),
        }
    }
}

/// Summary of the dashboard for presentation.
#[derive(Clone, Debug, Default)]
pub struct DashboardView {
    pub devices: Vec<DeviceRow>,
    pub experiment_id: Option<Id>,
    pub experiment: Option<ExperimentDetail>,
    pub script_pending: bool,
    pub error: Option<SharedError>,
}
