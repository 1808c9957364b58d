use std::sync::Arc;

use clap::Args;

use crate::infra::{demo_bureau, parse_strategy, sample_applicants, InMemoryEvaluationRepository};
use credit_engine::decision::{
    DecisionService, EngineConfig, EvaluationError, StrategyKind,
};
use credit_engine::error::AppError;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Risk strategy applied to every sample evaluation
    /// (conservative, balanced, or aggressive)
    #[arg(long, value_parser = parse_strategy)]
    pub(crate) strategy: Option<StrategyKind>,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let bureau = Arc::new(demo_bureau());
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let service = DecisionService::new(bureau, repository, EngineConfig::standard())?;

    let strategy = args.strategy.unwrap_or(StrategyKind::Balanced);
    println!("Credit decision demo ({} strategy)", strategy.label());

    for (profile, mut request) in sample_applicants() {
        request.strategy = Some(strategy);

        println!(
            "\n{} (document {}) requesting {} over {} months",
            profile.full_name, profile.document_id.0, request.amount, request.term_months
        );

        match service.evaluate(&profile, &request).await {
            Ok(decision) => {
                let record = decision.record();
                println!("- outcome: {}", record.status.label());
                if let Some(assessment) = &record.assessment {
                    println!(
                        "- internal score {} | blended score {} | tier {}",
                        assessment.internal_score,
                        assessment.blended_score,
                        assessment.tier.label()
                    );
                    println!(
                        "- suggested rate {}% | max amount {} | max term {} months",
                        assessment.suggested_annual_rate,
                        assessment.max_recommended_amount,
                        assessment.max_term_months
                    );
                    for finding in &assessment.gate_findings {
                        println!("- gate [{}]: {}", finding.severity.label(), finding.reason);
                        if let Some(remediation) = &finding.remediation {
                            println!("  remediation: {remediation}");
                        }
                    }
                    println!("- rationale: {}", assessment.rationale);
                }
            }
            Err(EvaluationError::Bureau(err)) => {
                println!("- outcome: error ({err})");
            }
            Err(err) => return Err(AppError::from(err)),
        }
    }

    Ok(())
}
