use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format. JSON output merges
/// the fields of `data` next to the message.
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(fields)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a key/value listing in the appropriate format
pub fn output_fields(output_format: OutputFormat, fields: &[(&str, String)]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let object: serde_json::Map<String, Value> = fields
                .iter()
                .map(|(key, value)| (key.to_string(), json!(value)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&Value::Object(object))?);
        }
        OutputFormat::Text => {
            for (key, value) in fields {
                println!("{}: {}", key, value);
            }
        }
    }
    Ok(())
}
