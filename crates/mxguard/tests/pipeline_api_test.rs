//! Integration tests for the DocumentPipeline API

use std::fs;

use mxguard::{
    DocumentPipeline, GenerationRequest, MxguardError, ServiceError, config::AppConfig,
    diagnostics::ErrorCode, write_document,
};

const VALID: &str = r##"<mxfile host="app.diagrams.net">
  <diagram name="Serverless" id="s1">
    <mxGraphModel>
      <root>
        <mxCell id="0"/>
        <mxCell id="1" parent="0"/>
        <mxCell id="vpc" value="VPC" style="shape=mxgraph.aws4.group;grIcon=mxgraph.aws4.group_vpc;" vertex="1" parent="1">
          <mxGeometry x="40" y="40" width="1200" height="700" as="geometry"/>
        </mxCell>
        <mxCell id="apigw" value="API Gateway" style="resIcon=mxgraph.aws4.api_gateway;" vertex="1" parent="1">
          <mxGeometry x="120" y="120" width="78" height="78" as="geometry"/>
        </mxCell>
        <mxCell id="fn" value="Lambda" style="resIcon=mxgraph.aws4.lambda;points=[[0,0],[1,1]];" vertex="1" parent="vpc">
          <mxGeometry x="400" y="120" width="78" height="78" as="geometry"/>
        </mxCell>
        <mxCell id="e1" edge="1" source="apigw" target="fn" parent="1">
          <mxGeometry relative="1" as="geometry"/>
        </mxCell>
      </root>
    </mxGraphModel>
  </diagram>
</mxfile>"##;

#[test]
fn test_default_pipeline_checks_valid_document() {
    let pipeline = DocumentPipeline::default();

    let checked = pipeline.check(VALID);

    assert!(checked.is_valid(), "{:?}", checked.result().diagnostics());
    assert_eq!(checked.document(), VALID);
}

#[test]
fn test_check_repairs_before_validating() {
    let raw = format!(
        "Sure, here it is:\n{}",
        VALID.replace("points=[[0,0],[1,1]]", "points=[[1.2,-3],[0.5,0.5]]")
    );

    let checked = DocumentPipeline::default().check(&raw);

    assert!(checked.is_valid());
    assert!(checked.document().starts_with("<mxfile"));
    assert!(checked.document().contains("points=[[1,0],[0.5,0.5]]"));
}

#[test]
fn test_config_limits_apply() {
    let config: AppConfig = toml::from_str("[validation]\nmax_extent = 1000").expect("config");
    let pipeline = DocumentPipeline::new(config).expect("valid rules");

    let result = pipeline.validate(VALID);

    // vpc: 40 + 1200
    assert_eq!(result.error_count(), 1);
    assert!(result.has_code(ErrorCode::E400));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config: AppConfig = toml::from_str("[validation]\nmax_extent = 0").expect("config");

    let err = DocumentPipeline::new(config).expect_err("zero extent");

    assert!(matches!(err, MxguardError::Config(_)));
}

#[test]
fn test_generate_uses_configured_budget() {
    let config = AppConfig::default().with_max_attempts(1);
    let pipeline = DocumentPipeline::new(config).expect("valid rules");
    let mut calls = 0;
    let mut generator = |_: &str, _: Option<&str>| -> Result<String, ServiceError> {
        calls += 1;
        Ok("I can't draw that.".to_string())
    };

    let outcome = pipeline
        .generate(&mut generator, &GenerationRequest::new("a shop"))
        .expect("no service error");

    assert_eq!(calls, 2);
    assert_eq!(outcome.attempts(), 2);
    assert_eq!(outcome.document(), "I can't draw that.");
    assert!(outcome.result().has_code(ErrorCode::E001));
}

#[test]
fn test_generate_and_write() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut generator =
        |_: &str, _: Option<&str>| -> Result<String, ServiceError> { Ok(format!("```xml\n{VALID}\n```")) };

    let outcome = DocumentPipeline::default()
        .generate(&mut generator, &GenerationRequest::new("serverless api"))
        .expect("no service error");
    let path = write_document(outcome.document(), dir.path().join("serverless")).expect("write");

    assert!(outcome.is_valid());
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("drawio"));
    assert_eq!(fs::read_to_string(path).expect("read"), VALID);
}
