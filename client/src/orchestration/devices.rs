use crate::{
    api::{
        LabMutationClient, LabQueryClient, operations,
        types::{CreateDeviceInput, Device, DeviceReservation, DeviceReservationInput, Id, UpdateDeviceInput},
    },
    errors::{LabClientError, SharedError},
    orchestration::{
        ActionResult, ActionState,
        cache::{CacheKey, QueryCache, remove_by_id, upsert_by_id},
        state::{ActionSlot, Mount},
    },
};

/// Single row of the device table.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DeviceRow {
    pub id: Id,
    pub name: String,
    pub port: String,
    pub device_type: String,
    pub software: Vec<String>,
}

impl From<&Device> for DeviceRow {
    fn from(device: &Device) -> Self {
        Self {
            id: device.id.clone(),
            name: device.name.clone(),
            port: device.port.clone(),
            device_type: device.device_type.name.clone(),
            software: device.software.iter().map(|sw| sw.name.clone()).collect(),
        }
    }
}

/// View model of the device table.
#[derive(Clone, Debug, Default)]
pub struct DeviceListView {
    pub rows: Vec<DeviceRow>,
    pub loading: bool,
    /// Rows come from an earlier fetch whose cache entry a mutation has since invalidated.
    pub stale: bool,
    pub error: Option<SharedError>,
}

fn devices_key() -> CacheKey {
    CacheKey::new(&operations::GET_DEVICES)
}

/// Loads the device list, serving it from the cache when present.
pub(crate) async fn load_devices<C>(
    client: &C,
    cache: &QueryCache,
    slot: &ActionSlot<Vec<Device>>,
    mount: &Mount,
) -> ActionResult<Vec<Device>>
where
    C: LabQueryClient + Sync,
{
    if let Some(devices) = cache.get::<Vec<Device>>(&devices_key()) {
        tracing::debug!(count = devices.len(), "devices served from cache");
        slot.set(mount, ActionState::Success(devices.clone()));
        return Ok(devices);
    }
    fetch_devices(client, cache, slot, mount).await
}

pub(crate) async fn fetch_devices<C>(
    client: &C,
    cache: &QueryCache,
    slot: &ActionSlot<Vec<Device>>,
    mount: &Mount,
) -> ActionResult<Vec<Device>>
where
    C: LabQueryClient + Sync,
{
    slot.run(mount, async {
        let devices = client.query_devices().await?;
        cache.insert(devices_key(), devices.clone());
        Ok(devices)
    })
    .await
}

/// Device management screen: lists devices and creates, edits or removes them.
pub struct DeviceScreen<C> {
    client: C,
    cache: QueryCache,
    mount: Mount,
    list: ActionSlot<Vec<Device>>,
    submit: ActionSlot<Device>,
    edit: ActionSlot<Device>,
    remove: ActionSlot<Device>,
}

impl<C> DeviceScreen<C>
where
    C: LabQueryClient + LabMutationClient + Send + Sync,
{
    pub fn new(client: C, cache: QueryCache) -> Self {
        Self {
            client,
            cache,
            mount: Mount::default(),
            list: ActionSlot::new("devices.load"),
            submit: ActionSlot::new("devices.submit"),
            edit: ActionSlot::new("devices.edit"),
            remove: ActionSlot::new("devices.remove"),
        }
    }

    /// Detaches the screen; completing operations no longer update its action states.
    pub fn unmount(&self) {
        self.mount.unmount();
    }

    /// Returns all action states of the screen to `Idle`.
    pub fn reset(&self) {
        self.list.reset();
        self.submit.reset();
        self.edit.reset();
        self.remove.reset();
    }

    pub async fn load(&self) -> ActionResult<Vec<Device>> {
        load_devices(&self.client, &self.cache, &self.list, &self.mount).await
    }

    pub async fn refresh(&self) -> ActionResult<Vec<Device>> {
        fetch_devices(&self.client, &self.cache, &self.list, &self.mount).await
    }

    /// Creates a device and adds it to the cached device list.
    pub async fn submit(&self, input: CreateDeviceInput) -> ActionResult<Device> {
        self.submit
            .run(&self.mount, async {
                let device = self.client.create_device(input).await?;
                self.cache
                    .reconcile(&operations::CREATE_DEVICE, &devices_key(), |list: &mut Vec<Device>| {
                        upsert_by_id(list, device.clone())
                    });
                Ok(device)
            })
            .await
    }

    /// Updates a device and replaces it in the cached device list.
    pub async fn edit(&self, input: UpdateDeviceInput) -> ActionResult<Device> {
        self.edit
            .run(&self.mount, async {
                let device = self.client.update_device(input).await?;
                self.cache
                    .reconcile(&operations::UPDATE_DEVICE, &devices_key(), |list: &mut Vec<Device>| {
                        upsert_by_id(list, device.clone())
                    });
                Ok(device)
            })
            .await
    }

    /// Removes a device and drops it from the cached device list.
    pub async fn remove(&self, id: &Id) -> ActionResult<Device> {
        self.remove
            .run(&self.mount, async {
                let device = self.client.remove_device(id).await?;
                self.cache
                    .reconcile(&operations::REMOVE_DEVICE, &devices_key(), |list: &mut Vec<Device>| {
                        remove_by_id(list, id)
                    });
                Ok(device)
            })
            .await
    }

    pub fn list_state(&self) -> ActionState<Vec<Device>> {
        self.list.get()
    }

    pub fn submit_state(&self) -> ActionState<Device> {
        self.submit.get()
    }

    pub fn edit_state(&self) -> ActionState<Device> {
        self.edit.get()
    }

    pub fn remove_state(&self) -> ActionState<Device> {
        self.remove.get()
    }

    pub fn view(&self) -> DeviceListView {
        let list = self.list.get();
        let cached = self.cache.get::<Vec<Device>>(&devices_key());
        let stale = cached.is_none() && list.value().is_some();

        let devices = cached.or_else(|| list.value().cloned()).unwrap_or_default();
        DeviceListView {
            rows: devices.iter().map(DeviceRow::from).collect(),
            loading: list.is_pending(),
            stale,
            error: list.error().cloned(),
        }
    }
}

/// View model of a single device with its reservation status.
#[derive(Clone, Debug, Default)]
pub struct DeviceDetailView {
    pub device: Option<DeviceRow>,
    pub reserved: Option<bool>,
    pub loading: bool,
    pub error: Option<SharedError>,
}

/// Detail screen of a single device.
pub struct DeviceDetailScreen<C> {
    client: C,
    cache: QueryCache,
    mount: Mount,
    id: Id,
    device_key: Option<CacheKey>,
    reservation_key: Option<CacheKey>,
    device: ActionSlot<(Device, DeviceReservation)>,
    reservation: ActionSlot<bool>,
}

impl<C> DeviceDetailScreen<C>
where
    C: LabQueryClient + LabMutationClient + Send + Sync,
{
    pub fn new(client: C, cache: QueryCache, id: Id) -> Self {
        Self {
            client,
            cache,
            mount: Mount::default(),
            device_key: CacheKey::with_variables(&operations::GET_DEVICE, &id),
            reservation_key: CacheKey::with_variables(&operations::GET_DEVICE_RESERVATION, &id),
            id,
            device: ActionSlot::new("device.load"),
            reservation: ActionSlot::new("device.reserve"),
        }
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn reset(&self) {
        self.device.reset();
        self.reservation.reset();
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    fn cached<T: Clone + 'static>(&self, key: &Option<CacheKey>) -> Option<T> {
        key.as_ref().and_then(|key| self.cache.get::<T>(key))
    }

    fn store<T: Send + Sync + 'static>(&self, key: &Option<CacheKey>, value: T) {
        if let Some(key) = key {
            self.cache.insert(key.clone(), value);
        }
    }

    /// Loads the device and its reservation status, serving each from the cache when present.
    pub async fn load(&self) -> ActionResult<(Device, DeviceReservation)> {
        self.device
            .run(&self.mount, async {
                let device = async {
                    match self.cached::<Device>(&self.device_key) {
                        Some(device) => Ok::<_, LabClientError>(device),
                        None => {
                            let device = self.client.query_device(&self.id).await?;
                            self.store(&self.device_key, device.clone());
                            Ok::<_, LabClientError>(device)
                        }
                    }
                };
                let reservation = async {
                    match self.cached::<DeviceReservation>(&self.reservation_key) {
                        Some(reservation) => Ok::<_, LabClientError>(reservation),
                        None => {
                            let reservation = self.client.query_device_reservation(&self.id).await?;
                            self.store(&self.reservation_key, reservation.clone());
                            Ok::<_, LabClientError>(reservation)
                        }
                    }
                };
                futures::try_join!(device, reservation)
            })
            .await
    }

    /// Reserves or releases the device.
    pub async fn set_reserved(&self, reserved: bool) -> ActionResult<bool> {
        self.reservation
            .run(&self.mount, async {
                let updated = self
                    .client
                    .update_device_reservation(DeviceReservationInput {
                        device_id: self.id.clone(),
                        is_reserved: reserved,
                    })
                    .await?;
                if updated == 0 {
                    tracing::warn!(device = %self.id.inner(), "reservation update matched no device");
                }
                match &self.reservation_key {
                    Some(key) => {
                        self.cache.reconcile(
                            &operations::UPDATE_DEVICE_RESERVATION,
                            key,
                            |reservation: &mut DeviceReservation| reservation.is_reserved = reserved,
                        );
                    }
                    None => {
                        self.cache.invalidate(&operations::UPDATE_DEVICE_RESERVATION);
                    }
                }
                Ok(updated > 0)
            })
            .await
    }

    pub fn reservation_state(&self) -> ActionState<bool> {
        self.reservation.get()
    }

    pub fn view(&self) -> DeviceDetailView {
        let state = self.device.get();
        let reservation = self.reservation.get();
        let device = self
            .cached::<Device>(&self.device_key)
            .or_else(|| state.value().map(|(device, _)| device.clone()));
        let reserved = self
            .cached::<DeviceReservation>(&self.reservation_key)
            .or_else(|| state.value().map(|(_, reservation)| reservation.clone()))
            .map(|reservation| reservation.is_reserved);

        DeviceDetailView {
            device: device.as_ref().map(DeviceRow::from),
            reserved,
            loading: state.is_pending() || reservation.is_pending(),
            error: state.error().or(reservation.error()).cloned(),
        }
    }
}
