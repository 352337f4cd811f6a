use clap::Parser;
use devreg_core::{
    qrcode::{QrCodeApiService, QrCodeRequest, QrCodeResponse},
    registry::{
        api::{CheckRequest, RegistryRequest, RegistryResponse},
        checks::CheckFn,
        init_registry_with_check,
        naming::{DeviceIdentifiers, EndDevice},
    },
};
use tower::{BoxError, Service};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "devreg_demo")]
#[command(about = "End-to-end walkthrough of the device registry stack")]
struct DevregDemoArgs {
    /// Number of devices to register
    #[arg(short, long, default_value_t = 4)]
    devices: u32,

    /// Application the devices belong to (the injected check rejects others)
    #[arg(short, long, default_value = "demo-app")]
    application_id: String,

    /// QR text format to encode the first device with
    #[arg(short, long, default_value = "tr005")]
    format: String,
}

fn demo_device(application_id: &str, index: u32) -> EndDevice {
    EndDevice::new(
        DeviceIdentifiers::new(application_id, format!("dev-{index}"))
            .with_join_eui(format!("70B3D57ED000{index:04X}").parse().unwrap())
            .with_dev_eui(format!("AABBCCDD0000{index:04X}").parse().unwrap()),
    )
    .with_name(format!("demo device {index}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    devreg_core::devreg_tracing::init();

    let args = DevregDemoArgs::parse();

    // Tenant ownership check: operations on foreign applications are vetoed
    // before any resolution happens
    let owned_application = args.application_id.clone();
    let tenant_check = CheckFn::new(move |request: CheckRequest| {
        let owned_application = owned_application.clone();
        async move {
            let application_id = match &request {
                CheckRequest::List(ids) | CheckRequest::Get(ids) | CheckRequest::Delete(ids) => {
                    ids.application_id.clone()
                }
                CheckRequest::Set { device, .. } => device.ids.application_id.clone(),
            };
            if application_id.as_deref() == Some(owned_application.as_str()) {
                Ok(())
            } else {
                Err(BoxError::from(format!(
                    "application is not owned by {owned_application}"
                )))
            }
        }
    });
    let mut registry = init_registry_with_check(tenant_check);
    let mut qrcode = QrCodeApiService::default();

    for index in 0..args.devices {
        registry
            .call(RegistryRequest::SetDevice {
                device: demo_device(&args.application_id, index),
                field_mask: Vec::new(),
            })
            .await?;
    }
    info!("registered {} devices under {}", args.devices, args.application_id);

    let filter = DeviceIdentifiers {
        application_id: Some(args.application_id.clone()),
        ..Default::default()
    };
    if let RegistryResponse::Devices(devices) =
        registry.call(RegistryRequest::ListDevices(filter)).await?
    {
        info!("listing finds {} devices", devices.len());
    }

    // Masked rename of the first device
    let first_ids = DeviceIdentifiers::new(args.application_id.clone(), "dev-0");
    registry
        .call(RegistryRequest::SetDevice {
            device: EndDevice::new(first_ids.clone()).with_name("renamed demo device"),
            field_mask: vec!["name".to_string()],
        })
        .await?;
    if let RegistryResponse::Device(device) =
        registry.call(RegistryRequest::GetDevice(first_ids.clone())).await?
    {
        info!("device dev-0 is now named {:?}", device.name);

        if let QrCodeResponse::Text(text) = qrcode
            .call(QrCodeRequest::GenerateText { format_id: args.format.clone(), device })
            .await?
        {
            info!("QR text for dev-0 ({}): {}", args.format, text);
        }
    }

    // A foreign tenant is rejected by the injected check
    let foreign = registry
        .call(RegistryRequest::GetDevice(DeviceIdentifiers::new("other-app", "dev-0")))
        .await;
    info!("foreign tenant get is vetoed: {}", foreign.unwrap_err());

    registry.call(RegistryRequest::DeleteDevice(first_ids.clone())).await?;
    let gone = registry.call(RegistryRequest::GetDevice(first_ids)).await;
    info!("after delete, get reports: {}", gone.unwrap_err());

    Ok(())
}
