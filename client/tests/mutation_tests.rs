use labdash_client::{
    LabClient,
    api::{LabAuthClient, LabMutationClient, LabQueryClient, LabScriptClient, types::*},
    errors::{ErrorKind, ValidationErrorKind},
    orchestration::{DashboardScreen, QueryCache, SessionScreen, SoftwareScreen, device_config},
};

use crate::common::{RequestRecorder, graphql_server};

mod common;

#[tokio::test]
async fn login_sets_bearer_token_for_later_requests() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let recorder = RequestRecorder::default();

    let login = server
        .mock("POST", "/graphql")
        .match_body(mockito::Matcher::Regex("login".into()))
        .match_request(recorder.as_matcher())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
              "data": {
                "login": {
                  "access_token": "tok123",
                  "refresh_token": "ref123",
                  "expires_in": 3600,
                  "token_type": "Bearer",
                  "user": { "id": "1", "name": "u", "email": "u@x.com" }
                }
              }
            }"#,
        )
        .create_async()
        .await;

    let cli = LabClient::new(server.url().parse()?, Default::default())?;
    let session = SessionScreen::new(cli.clone(), QueryCache::new());

    session.login("u", "p").await?;
    let view = session.view();
    assert!(view.authenticated);
    assert_eq!(view.user.and_then(|u| u.id), Some(Id::new("1")));
    login.assert_async().await;

    let login_request = &recorder.requests()[0];
    assert!(login_request.authorization.is_none());
    assert_eq!(login_request.json()["variables"]["login"]["username"], "u");

    let devices = server
        .mock("POST", "/graphql")
        .match_header("authorization", "Bearer tok123")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "data": { "devices": { "data": [] } } }"#)
        .create_async()
        .await;

    assert!(cli.query_devices().await?.is_empty());
    devices.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn remove_software_in_use_surfaces_graphql_error() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;

    let list = server
        .mock("POST", "/graphql")
        .match_body(mockito::Matcher::Regex(r#""query":"query "#.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "data": { "software": { "data": [ { "id": "5", "name": "python" }, { "id": "6", "name": "matlab" } ] } }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let remove = server
        .mock("POST", "/graphql")
        .match_body(mockito::Matcher::Regex("removeSoftware".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{ "data": null, "errors": [ { "message": "in use", "path": ["removeSoftware"] } ] }"#)
        .create_async()
        .await;

    let cli = LabClient::new(server.url().parse()?, Default::default())?;
    let screen = SoftwareScreen::new(cli, QueryCache::new());
    screen.load().await?;

    let err = screen.remove(&Id::new("5")).await.unwrap_err();
    let errors = err.graphql_errors().expect("must be a graphql error");
    assert_eq!(errors[0].message, "in use");

    let view = screen.view();
    assert_eq!(view.rows.len(), 2);
    assert!(screen.remove_state().is_failed());

    list.assert_async().await;
    remove.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn create_device_sends_input() -> anyhow::Result<()> {
    let (server, mock, recorder) = graphql_server(
        r#"{
          "data": {
            "createDevice": {
              "id": "21",
              "name": "D1",
              "port": "/dev/ttyUSB4",
              "deviceType": { "id": "10", "name": "sensor" },
              "software": [ { "id": "5", "name": "python" } ]
            }
          }
        }"#,
    )
    .await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let device = cli
        .create_device(CreateDeviceInput {
            device_type_id: Id::new("10"),
            name: "D1".into(),
            port: "/dev/ttyUSB4".into(),
            software: vec![Id::new("5")],
            status: Some(DeviceStatus::Online),
        })
        .await?;
    assert_eq!(device.id, Id::new("21"));

    mock.assert_async().await;
    let request = &recorder.requests()[0];
    let variables = request.json()["variables"].to_string();
    assert!(variables.contains(r#""device_type_id":"10""#));
    assert!(variables.contains(r#""status":"online""#));
    assert!(request.query().contains("createDevice"));

    Ok(())
}

#[tokio::test]
async fn invalid_input_is_not_sent() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/graphql").expect(0).create_async().await;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let err = cli.create_software(CreateSoftwareInput { name: "".into() }).await.unwrap_err();
    assert!(err.is_validation());

    let err = cli.remove_device(&Id::new(" ")).await.unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::ValidationError(ValidationErrorKind::Input(errors)) if errors.field_errors().contains_key("id")
    ));

    let err = cli
        .run_script(RunScriptInput {
            device: Some(DeviceConfigInput {
                device_id: Id::new(""),
                device_name: Some("sensor".into()),
                software: None,
            }),
            script_name: Some("start".into()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::ValidationError(ValidationErrorKind::Input(errors)) if errors.errors().contains_key("device")
    ));

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn stop_without_started_run_sends_nothing() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/graphql").expect(0).create_async().await;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;
    let dashboard = DashboardScreen::new(cli, QueryCache::new());

    let device = Device {
        id: Id::new("1"),
        name: "pendulum".into(),
        port: "/dev/ttyUSB0".into(),
        device_type: DeviceType {
            id: Id::new("10"),
            name: "sensor".into(),
        },
        software: vec![],
    };

    let err = dashboard
        .submit(ScriptName::Stop, device_config(&device, None), serde_json::json!({}))
        .await
        .unwrap_err();
    assert!(err.is_precondition());

    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn run_script_returns_experiment_id() -> anyhow::Result<()> {
    let (server, mock, recorder) = graphql_server(
        r#"{ "data": { "RunScript": { "status": "running", "experimentID": "42", "errorMessage": "" } } }"#,
    )
    .await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;
    let dashboard = DashboardScreen::new(cli, QueryCache::new());

    let device = DeviceConfigInput {
        device_id: Id::new("1"),
        device_name: Some("tom1a".into()),
        software: Some("matlab".into()),
    };
    dashboard
        .submit(ScriptName::Start, device, serde_json::json!({ "reg_request": 30 }))
        .await?;
    assert_eq!(dashboard.run().experiment_id(), Some(Id::new("42")));

    mock.assert_async().await;
    let variables = recorder.requests()[0].json()["variables"].to_string();
    assert!(variables.contains(r#""scriptName":"start""#));
    assert!(variables.contains(r#""fileName":"""#));
    assert!(variables.contains(r#""deviceID":"1""#));

    Ok(())
}

#[tokio::test]
async fn logout_clears_token() -> anyhow::Result<()> {
    let (server, mock, recorder) =
        graphql_server(r#"{ "data": { "logout": { "status": "LOGGED_OUT", "message": null } } }"#).await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;
    cli.set_access_token(Some("tok123".into()));

    let response = cli.logout().await?;
    assert_eq!(response.status, "LOGGED_OUT");
    assert!(cli.access_token().is_none());

    mock.assert_async().await;
    assert_eq!(recorder.requests()[0].authorization.as_deref(), Some("Bearer tok123"));

    Ok(())
}

#[tokio::test]
async fn reservation_update_returns_count() -> anyhow::Result<()> {
    let (server, mock, _recorder) = graphql_server(
        r#"{ "data": { "updateDeviceReservationStatus": { "updatedDevicesCount": 1 } } }"#,
    )
    .await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let updated = cli
        .update_device_reservation(DeviceReservationInput {
            device_id: Id::new("1"),
            is_reserved: true,
        })
        .await?;
    assert_eq!(updated, 1);
    mock.assert_async().await;

    Ok(())
}
