//! Prompt templates.
//!
//! Each prompt declares its arguments through an object schema. Required
//! arguments are listed under `required`; optional ones carry a `default`
//! that validation fills in before the template renders.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::capability::{
    CapabilityDescriptor, Handler, PromptHandler, PromptMessage, RegistryBuilder,
};
use crate::error::{HandlerError, RegistryError};

/// Registers every prompt, in listing order.
///
/// # Errors
///
/// Returns an error if a prompt name is already registered.
pub fn register(builder: &mut RegistryBuilder) -> Result<(), RegistryError> {
    builder
        .add(Handler::prompt(AnalyzeDataPrompt))?
        .add(Handler::prompt(GenerateReportPrompt))?
        .add(Handler::prompt(TroubleshootSystemPrompt))?;
    Ok(())
}

/// `analyze_data`: structured analysis of one data source.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyzeDataPrompt;

#[async_trait]
impl PromptHandler for AnalyzeDataPrompt {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            "analyze_data",
            "Analyze data from various sources with structured output",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "data_source": {
                    "type": "string",
                    "description": "Source of data to analyze (logs, profiles, api)"
                },
                "analysis_type": {
                    "type": "string",
                    "description": "Type of analysis (summary, trends, errors)"
                }
            },
            "required": ["data_source", "analysis_type"]
        }))
    }

    async fn generate(&self, arguments: Value) -> Result<Vec<PromptMessage>, HandlerError> {
        let data_source = argument(&arguments, "data_source")?;
        let analysis_type = argument(&arguments, "analysis_type")?;

        Ok(vec![PromptMessage::user(format!(
            "Please analyze the {data_source} data and provide a {analysis_type} analysis.\n\
             Focus on key insights, patterns, and actionable recommendations.\n\
             \n\
             Structure your response as:\n\
             1. Executive Summary\n\
             2. Key Findings\n\
             3. Detailed Analysis\n\
             4. Recommendations\n\
             5. Next Steps"
        ))])
    }
}

/// `generate_report`: a periodic report outline.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateReportPrompt;

#[async_trait]
impl PromptHandler for GenerateReportPrompt {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            "generate_report",
            "Generate comprehensive reports with data visualization suggestions",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "report_type": {
                    "type": "string",
                    "description": "Type of report (performance, user_activity, system_health)"
                },
                "time_period": {
                    "type": "string",
                    "description": "Time period for the report (daily, weekly, monthly)",
                    "default": "weekly"
                }
            },
            "required": ["report_type"]
        }))
    }

    async fn generate(&self, arguments: Value) -> Result<Vec<PromptMessage>, HandlerError> {
        let report_type = argument(&arguments, "report_type")?;
        let time_period = argument(&arguments, "time_period")?;

        Ok(vec![PromptMessage::user(format!(
            "Create a comprehensive {report_type} report for the {time_period} period.\n\
             \n\
             Include:\n\
             - Key metrics and KPIs\n\
             - Trend analysis\n\
             - Comparative data\n\
             - Visual charts recommendations\n\
             - Risk assessment\n\
             - Strategic recommendations\n\
             \n\
             Use data from available resources and tools to support your analysis."
        ))])
    }
}

/// `troubleshoot_system`: guidance for a reported issue.
#[derive(Debug, Clone, Copy, Default)]
pub struct TroubleshootSystemPrompt;

#[async_trait]
impl PromptHandler for TroubleshootSystemPrompt {
    fn descriptor(&self) -> CapabilityDescriptor {
        CapabilityDescriptor::new(
            "troubleshoot_system",
            "Provide system troubleshooting guidance based on logs and metrics",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "issue_description": {
                    "type": "string",
                    "description": "Description of the system issue"
                },
                "severity": {
                    "type": "string",
                    "description": "Issue severity (low, medium, high, critical)",
                    "default": "medium"
                }
            },
            "required": ["issue_description"]
        }))
    }

    async fn generate(&self, arguments: Value) -> Result<Vec<PromptMessage>, HandlerError> {
        let issue = argument(&arguments, "issue_description")?;
        let severity = argument(&arguments, "severity")?;

        Ok(vec![PromptMessage::user(format!(
            "System Issue: {issue}\n\
             Severity: {severity}\n\
             \n\
             Please provide troubleshooting guidance:\n\
             \n\
             1. Immediate Actions\n\
             2. Diagnostic Steps\n\
             3. Root Cause Analysis\n\
             4. Resolution Steps\n\
             5. Prevention Measures\n\
             \n\
             Use system logs and available data to inform your recommendations.\n\
             Prioritize based on severity level."
        ))])
    }
}

fn argument<'a>(arguments: &'a Value, name: &str) -> Result<&'a str, HandlerError> {
    arguments
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| HandlerError::new(format!("Missing required argument: {name}")))
}
