use std::fmt::Debug;

use crate::{
    api::{
        LabMutationClient, LabQueryClient, Result,
        operations::{self, OperationDescriptor},
        types::{
            CreateDeviceTypeInput, CreateSoftwareInput, DeviceType, Id, Software, UpdateDeviceTypeInput,
            UpdateSoftwareInput,
        },
    },
    errors::SharedError,
    orchestration::{
        ActionResult, ActionState,
        cache::{CacheKey, Identified, QueryCache, remove_by_id, upsert_by_id},
        state::{ActionSlot, Mount},
    },
};

/// Named entity managed by a [`CatalogScreen`].
#[async_trait::async_trait]
pub trait CatalogEntity: Identified + Clone + Debug + Send + Sync + 'static {
    type CreateInput: Debug + Send;
    type UpdateInput: Debug + Send;

    const LIST: &'static OperationDescriptor;
    const CREATE: &'static OperationDescriptor;
    const UPDATE: &'static OperationDescriptor;
    const REMOVE: &'static OperationDescriptor;

    fn name(&self) -> &str;

    async fn fetch<C: LabQueryClient + Sync>(client: &C) -> Result<Vec<Self>>;
    async fn create<C: LabMutationClient + Sync>(client: &C, input: Self::CreateInput) -> Result<Self>;
    async fn update<C: LabMutationClient + Sync>(client: &C, input: Self::UpdateInput) -> Result<Self>;
    async fn remove<C: LabMutationClient + Sync>(client: &C, id: &Id) -> Result<Self>;
}

#[async_trait::async_trait]
impl CatalogEntity for Software {
    type CreateInput = CreateSoftwareInput;
    type UpdateInput = UpdateSoftwareInput;

    const LIST: &'static OperationDescriptor = &operations::GET_SOFTWARE;
    const CREATE: &'static OperationDescriptor = &operations::CREATE_SOFTWARE;
    const UPDATE: &'static OperationDescriptor = &operations::UPDATE_SOFTWARE;
    const REMOVE: &'static OperationDescriptor = &operations::REMOVE_SOFTWARE;

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch<C: LabQueryClient + Sync>(client: &C) -> Result<Vec<Self>> {
        client.query_software().await
    }

    async fn create<C: LabMutationClient + Sync>(client: &C, input: Self::CreateInput) -> Result<Self> {
        client.create_software(input).await
    }

    async fn update<C: LabMutationClient + Sync>(client: &C, input: Self::UpdateInput) -> Result<Self> {
        client.update_software(input).await
    }

    async fn remove<C: LabMutationClient + Sync>(client: &C, id: &Id) -> Result<Self> {
        client.remove_software(id).await
    }
}

#[async_trait::async_trait]
impl CatalogEntity for DeviceType {
    type CreateInput = CreateDeviceTypeInput;
    type UpdateInput = UpdateDeviceTypeInput;

    const LIST: &'static OperationDescriptor = &operations::GET_DEVICE_TYPES;
    const CREATE: &'static OperationDescriptor = &operations::CREATE_DEVICE_TYPE;
    const UPDATE: &'static OperationDescriptor = &operations::UPDATE_DEVICE_TYPE;
    const REMOVE: &'static OperationDescriptor = &operations::REMOVE_DEVICE_TYPE;

    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch<C: LabQueryClient + Sync>(client: &C) -> Result<Vec<Self>> {
        client.query_device_types().await
    }

    async fn create<C: LabMutationClient + Sync>(client: &C, input: Self::CreateInput) -> Result<Self> {
        client.create_device_type(input).await
    }

    async fn update<C: LabMutationClient + Sync>(client: &C, input: Self::UpdateInput) -> Result<Self> {
        client.update_device_type(input).await
    }

    async fn remove<C: LabMutationClient + Sync>(client: &C, id: &Id) -> Result<Self> {
        client.remove_device_type(id).await
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CatalogRow {
    pub id: Id,
    pub name: String,
}

/// View model of a software or device type table.
#[derive(Clone, Debug, Default)]
pub struct CatalogView {
    pub rows: Vec<CatalogRow>,
    pub loading: bool,
    pub stale: bool,
    pub error: Option<SharedError>,
}

/// Screen that lists and manages one kind of [named entity](CatalogEntity).
pub struct CatalogScreen<E, C> {
    client: C,
    cache: QueryCache,
    mount: Mount,
    list: ActionSlot<Vec<E>>,
    submit: ActionSlot<E>,
    edit: ActionSlot<E>,
    remove: ActionSlot<E>,
}

pub type SoftwareScreen<C> = CatalogScreen<Software, C>;
pub type DeviceTypeScreen<C> = CatalogScreen<DeviceType, C>;

impl<E, C> CatalogScreen<E, C>
where
    E: CatalogEntity,
    C: LabQueryClient + LabMutationClient + Send + Sync,
{
    pub fn new(client: C, cache: QueryCache) -> Self {
        Self {
            client,
            cache,
            mount: Mount::default(),
            list: ActionSlot::new(E::LIST.name),
            submit: ActionSlot::new(E::CREATE.name),
            edit: ActionSlot::new(E::UPDATE.name),
            remove: ActionSlot::new(E::REMOVE.name),
        }
    }

    pub fn unmount(&self) {
        self.mount.unmount();
    }

    pub fn reset(&self) {
        self.list.reset();
        self.submit.reset();
        self.edit.reset();
        self.remove.reset();
    }

    fn list_key() -> CacheKey {
        CacheKey::new(E::LIST)
    }

    pub async fn load(&self) -> ActionResult<Vec<E>> {
        if let Some(items) = self.cache.get::<Vec<E>>(&Self::list_key()) {
            tracing::debug!(operation = E::LIST.name, count = items.len(), "served from cache");
            self.list.set(&self.mount, ActionState::Success(items.clone()));
            return Ok(items);
        }
        self.refresh().await
    }

    pub async fn refresh(&self) -> ActionResult<Vec<E>> {
        self.list
            .run(&self.mount, async {
                let items = E::fetch(&self.client).await?;
                self.cache.insert(Self::list_key(), items.clone());
                Ok(items)
            })
            .await
    }

    pub async fn submit(&self, input: E::CreateInput) -> ActionResult<E> {
        self.submit
            .run(&self.mount, async {
                let item = E::create(&self.client, input).await?;
                self.cache
                    .reconcile(E::CREATE, &Self::list_key(), |list: &mut Vec<E>| upsert_by_id(list, item.clone()));
                Ok(item)
            })
            .await
    }

    pub async fn edit(&self, input: E::UpdateInput) -> ActionResult<E> {
        self.edit
            .run(&self.mount, async {
                let item = E::update(&self.client, input).await?;
                self.cache
                    .reconcile(E::UPDATE, &Self::list_key(), |list: &mut Vec<E>| upsert_by_id(list, item.clone()));
                Ok(item)
            })
            .await
    }

    pub async fn remove(&self, id: &Id) -> ActionResult<E> {
        self.remove
            .run(&self.mount, async {
                let item = E::remove(&self.client, id).await?;
                self.cache
                    .reconcile(E::REMOVE, &Self::list_key(), |list: &mut Vec<E>| remove_by_id(list, id));
                Ok(item)
            })
            .await
    }

    pub fn list_state(&self) -> ActionState<Vec<E>> {
        self.list.get()
    }

    pub fn submit_state(&self) -> ActionState<E> {
        self.submit.get()
    }

    pub fn edit_state(&self) -> ActionState<E> {
        self.edit.get()
    }

    pub fn remove_state(&self) -> ActionState<E> {
        self.remove.get()
    }

    pub fn view(&self) -> CatalogView {
        let list = self.list.get();
        let cached = self.cache.get::<Vec<E>>(&Self::list_key());
        let stale = cached.is_none() && list.value().is_some();

        let items = cached.or_else(|| list.value().cloned()).unwrap_or_default();
        CatalogView {
            rows: items
                .iter()
                .map(|item| CatalogRow {
                    id: item.id().clone(),
                    name: item.name().to_string(),
                })
                .collect(),
            loading: list.is_pending(),
            stale,
            error: list.error().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        InjectedFailure, LabTestClient, LabTestState,
        api::types::Device,
        errors::FieldError,
        orchestration::DeviceScreen,
    };

    fn lab_state() -> LabTestState {
        let sensor = DeviceType {
            id: Id::new("10"),
            name: "sensor".into(),
        };
        let python = Software {
            id: Id::new("5"),
            name: "python".into(),
        };

        LabTestState {
            devices: vec![Device {
                id: Id::new("1"),
                name: "pendulum".into(),
                port: "/dev/ttyUSB0".into(),
                device_type: sensor.clone(),
                software: vec![python.clone()],
            }],
            device_types: vec![sensor],
            software: vec![
                python,
                Software {
                    id: Id::new("6"),
                    name: "openmodelica".into(),
                },
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn removing_software_in_use_keeps_the_list() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let screen = SoftwareScreen::new(client.clone(), QueryCache::new());
        screen.load().await?;

        client.fail_operation(
            &operations::REMOVE_SOFTWARE,
            InjectedFailure::GraphQL(vec![FieldError::new("in use")]),
        );
        let err = screen.remove(&Id::new("5")).await.unwrap_err();

        let errors = err.graphql_errors().expect("must be a graphql error");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "in use");
        assert!(screen.remove_state().is_failed());

        let view = screen.view();
        assert_eq!(view.rows.len(), 2);
        assert!(!view.stale);
        assert!(view.error.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn software_rename_invalidates_device_list() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let cache = QueryCache::new();
        let devices = DeviceScreen::new(client.clone(), cache.clone());
        let software = SoftwareScreen::new(client.clone(), cache.clone());
        devices.load().await?;
        software.load().await?;

        software
            .edit(UpdateSoftwareInput {
                id: Id::new("5"),
                name: "python3".into(),
            })
            .await?;

        assert!(software.view().rows.iter().any(|row| row.name == "python3"));
        assert!(devices.view().stale);

        devices.load().await?;
        assert_eq!(client.request_count(&operations::GET_DEVICES), 2);
        assert_eq!(devices.view().rows[0].software, vec!["python3"]);
        assert_eq!(client.request_count(&operations::GET_SOFTWARE), 1);
        Ok(())
    }

    #[tokio::test]
    async fn device_types_are_created_and_removed() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        let screen = DeviceTypeScreen::new(client.clone(), QueryCache::new());
        screen.load().await?;

        let created = screen
            .submit(CreateDeviceTypeInput {
                name: "camera".into(),
            })
            .await?;
        assert_eq!(screen.view().rows.len(), 2);
        assert_eq!(screen.submit_state().value(), Some(&created));

        screen.remove(&created.id).await?;
        assert_eq!(screen.view().rows.len(), 1);

        let err = screen.remove(&Id::new("10")).await.unwrap_err();
        assert!(err.graphql_errors().is_some());
        assert_eq!(screen.view().rows.len(), 1);
        assert_eq!(client.request_count(&operations::GET_DEVICE_TYPES), 1);
        Ok(())
    }

    #[tokio::test]
    async fn list_failure_is_recorded() -> anyhow::Result<()> {
        let client = LabTestClient::new(lab_state());
        client.fail_operation(
            &operations::GET_SOFTWARE,
            InjectedFailure::Transport("connection refused".into()),
        );
        let screen = SoftwareScreen::new(client.clone(), QueryCache::new());

        assert!(screen.load().await.is_err());
        let view = screen.view();
        assert!(view.rows.is_empty());
        assert!(view.error.is_some());

        client.clear_failure(&operations::GET_SOFTWARE);
        screen.load().await?;
        assert!(screen.view().error.is_none());
        assert_eq!(screen.view().rows.len(), 2);
        Ok(())
    }
}
