use anyhow::Result;
use authgate::{AuthResult, RegisteredClientService, ServiceDirectory};

use crate::cli::{OutputFormat, ServicesArgs};
use crate::output::{print_json, print_table};

pub async fn services(
    args: &ServicesArgs,
    directory: &dyn ServiceDirectory,
    format: OutputFormat,
) -> Result<()> {
    let services = select_services(directory, args.client_id.as_deref()).await?;

    if matches!(format, OutputFormat::Json) {
        return print_json(&services);
    }

    if services.is_empty() {
        println!("No services registered.");
        return Ok(());
    }

    let rows = services
        .iter()
        .map(|s| {
            let mut response_types: Vec<&str> =
                s.supported_response_types.iter().map(String::as_str).collect();
            response_types.sort_unstable();
            let response_types = if response_types.is_empty() {
                "*".to_string()
            } else {
                response_types.join(", ")
            };

            [
                s.id.to_string(),
                s.name.clone(),
                s.client_id.clone(),
                s.service_id.to_string(),
                response_types,
                s.access_strategy.is_service_access_allowed().to_string(),
                s.evaluation_order.to_string(),
            ]
        })
        .collect();

    print_table(
        [
            "ID",
            "Name",
            "Client ID",
            "Service ID",
            "Response Types",
            "Enabled",
            "Order",
        ],
        rows,
    );
    println!("Total: {}", services.len());
    Ok(())
}

async fn select_services(
    directory: &dyn ServiceDirectory,
    client_id: Option<&str>,
) -> AuthResult<Vec<RegisteredClientService>> {
    match client_id {
        Some(client_id) => Ok(directory
            .find_by_client_id(client_id)
            .await?
            .into_iter()
            .collect()),
        None => directory.list_all().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate::InMemoryServiceDirectory;

    fn directory() -> InMemoryServiceDirectory {
        InMemoryServiceDirectory::with_services(vec![
            RegisteredClientService::new(1, "App", "app", "https://app\\.example\\.org/.*").unwrap(),
            RegisteredClientService::new(2, "Admin", "admin", "https://admin\\.example\\.org/.*")
                .unwrap(),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_select_services_by_client_id() {
        let directory = directory();

        let all = select_services(&directory, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let admin = select_services(&directory, Some("admin")).await.unwrap();
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].name, "Admin");

        assert!(select_services(&directory, Some("nobody")).await.unwrap().is_empty());
    }
}
