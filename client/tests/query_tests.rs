use labdash_client::{
    LabClient,
    api::{LabQueryClient, types::*},
    errors::ErrorKind,
    orchestration::{DeviceScreen, QueryCache},
};

use crate::common::graphql_server;

mod common;

const TWO_DEVICES: &str = r#"{
  "data": {
    "devices": {
      "data": [
        {
          "id": "1",
          "name": "pendulum",
          "port": "/dev/ttyUSB0",
          "deviceType": { "id": "10", "name": "sensor" },
          "software": [ { "id": "5", "name": "python" } ]
        },
        {
          "id": "2",
          "name": "thermal plant",
          "port": "/dev/ttyUSB1",
          "deviceType": { "id": "11", "name": "tom1a" },
          "software": [ { "id": "5", "name": "python" }, { "id": "6", "name": "matlab" } ]
        }
      ]
    }
  }
}"#;

#[tokio::test]
async fn query_devices() -> anyhow::Result<()> {
    let (server, mock, recorder) = graphql_server(TWO_DEVICES).await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let devices = cli.query_devices().await?;
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].device_type.name, "tom1a");
    assert_eq!(devices[1].software.len(), 2);

    mock.assert_async().await;

    let requests = recorder.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path_and_query, "/graphql");
    assert!(requests[0].query().contains("devices"));
    assert!(requests[0].query().contains("deviceType"));
    // The wire operation name comes from the fragment type, not from the descriptor table.
    assert_eq!(requests[0].json()["operationName"], "QueryDevices");
    assert!(requests[0].authorization.is_none());

    Ok(())
}

#[tokio::test]
async fn device_screen_joins_names_and_serves_cache() -> anyhow::Result<()> {
    let (server, mock, _recorder) = graphql_server(TWO_DEVICES).await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;
    let screen = DeviceScreen::new(cli, QueryCache::new());

    let first = screen.load().await?;
    let second = screen.load().await?;
    assert_eq!(first, second);

    let view = screen.view();
    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[0].device_type, "sensor");
    assert_eq!(view.rows[1].software, vec!["python", "matlab"]);

    // Mocks expect exactly one hit, so the second load never reached the server.
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn query_device_by_id() -> anyhow::Result<()> {
    let (server, mock, recorder) = graphql_server(
        r#"{
          "data": {
            "getDevice": {
              "id": "7",
              "name": "levitation",
              "port": "/dev/ttyACM3",
              "deviceType": { "id": "12", "name": "maglev" },
              "software": []
            }
          }
        }"#,
    )
    .await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let device = cli.query_device(&Id::new("7")).await?;
    assert_eq!(device.name, "levitation");
    assert!(device.software.is_empty());

    mock.assert_async().await;
    assert_eq!(recorder.requests()[0].json()["variables"]["id"], "7");

    Ok(())
}

#[tokio::test]
async fn query_software_without_page_is_empty() -> anyhow::Result<()> {
    let (server, mock, _recorder) = graphql_server(r#"{ "data": { "software": null } }"#).await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    assert!(cli.query_software().await?.is_empty());
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn query_experiment_details() -> anyhow::Result<()> {
    let (server, mock, recorder) = graphql_server(
        r#"{
          "data": {
            "experimentDetails": {
              "url": null,
              "status": "running",
              "values": [
                { "name": "temperature", "data": [21.5, 21.7, null] },
                null
              ]
            }
          }
        }"#,
    )
    .await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let details = cli
        .query_experiment_details(&Id::new("exp-1"))
        .await?
        .expect("experiment must exist");
    assert_eq!(details.status, Some(ExperimentStatus::Running));
    assert_eq!(details.values.len(), 2);
    let series = details.values[0].as_ref().expect("first series");
    assert_eq!(series.data, vec![Some(21.5), Some(21.7), None]);

    mock.assert_async().await;
    assert_eq!(recorder.requests()[0].json()["variables"]["id"], "exp-1");

    Ok(())
}

#[tokio::test]
async fn query_script_config_flattens_items() -> anyhow::Result<()> {
    let (server, mock, recorder) = graphql_server(
        r#"{
          "data": {
            "GetConfigByDeviceType": {
              "items": [
                {
                  "scriptName": "start",
                  "items": [
                    {
                      "name": "reg_request",
                      "rules": "required",
                      "type": "number",
                      "title": "Desired value",
                      "placeholder": "30",
                      "options": null
                    }
                  ]
                },
                null
              ]
            }
          }
        }"#,
    )
    .await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let config = cli
        .query_script_config(ScriptConfigInput {
            device_name: Some("tom1a".into()),
            software: Some("matlab".into()),
        })
        .await?;
    assert_eq!(config.len(), 1);
    assert_eq!(config[0].script_name, Some(ScriptName::Start));

    mock.assert_async().await;
    let variables = recorder.requests()[0].json()["variables"].to_string();
    assert!(variables.contains(r#""deviceName":"tom1a""#));

    Ok(())
}

#[tokio::test]
async fn partial_errors_still_return_data() -> anyhow::Result<()> {
    let (server, mock, _recorder) = graphql_server(
        r#"{
          "data": { "me": null },
          "errors": [ { "message": "not authenticated", "path": ["me"] } ]
        }"#,
    )
    .await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    assert!(cli.query_me().await?.is_none());
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn undecodable_response_is_validation_error() -> anyhow::Result<()> {
    let (server, mock, _recorder) =
        graphql_server(r#"{ "data": { "cameraStatus": { "isConnected": "maybe" } } }"#).await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let err = cli.query_camera_status().await.unwrap_err();
    assert!(err.is_validation(), "unexpected error: {err}");
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_network_error() -> anyhow::Result<()> {
    let cli = LabClient::new("http://127.0.0.1:1".parse()?, Default::default())?;

    let err = cli.query_devices().await.unwrap_err();
    assert!(err.is_network(), "unexpected error: {err}");

    Ok(())
}

#[tokio::test]
async fn null_data_is_validation_error() -> anyhow::Result<()> {
    let (server, mock, _recorder) = graphql_server(r#"{ "data": null }"#).await?;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let err = cli.query_devices().await.unwrap_err();
    assert!(err.is_validation(), "unexpected error: {err}");
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn unavailable_gateway_is_network_error() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(503)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Service Unavailable</body></html>")
        .expect(2)
        .create_async()
        .await;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let err = cli.query_devices().await.unwrap_err();
    assert!(err.is_network(), "unexpected error: {err}");

    let err = cli.query_camera_status().await.unwrap_err();
    match err.kind() {
        ErrorKind::NetworkError(error) => assert_eq!(error.status().map(|s| s.as_u16()), Some(503)),
        other => panic!("unexpected error: {other}"),
    }
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn rate_limited_request_is_network_error() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let err = cli.query_software().await.unwrap_err();
    assert!(err.is_network(), "unexpected error: {err}");
    mock.assert_async().await;

    Ok(())
}

#[tokio::test]
async fn wrong_endpoint_is_configuration_error() -> anyhow::Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/graphql")
        .with_status(404)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Not Found</body></html>")
        .create_async()
        .await;
    let cli = LabClient::new(server.url().parse()?, Default::default())?;

    let err = cli.query_devices().await.unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::ConfigurationError(_)),
        "unexpected error: {err}"
    );
    mock.assert_async().await;

    Ok(())
}
