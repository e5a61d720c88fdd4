use crate::suite::{CaseFailure, ProbeCase};

#[derive(Debug)]
pub struct CaseOutcome {
    pub case: ProbeCase,
    pub result: Result<(), CaseFailure>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct SuiteReport {
    pub run_id: uuid::Uuid,
    pub username: String,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(CaseOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CaseOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn outcome(&self, case: ProbeCase) -> Option<&CaseOutcome> {
        self.outcomes.iter().find(|o| o.case == case)
    }
}

impl std::fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "run {} as {}", self.run_id, self.username)?;
        for outcome in &self.outcomes {
            let verdict = if outcome.passed() { "PASSED" } else { "FAILED" };
            writeln!(f, "{} {}", outcome.case, verdict)?;
        }
        let failed = self.failures().count();
        if failed > 0 {
            writeln!(f)?;
            for outcome in self.failures() {
                if let Err(e) = &outcome.result {
                    writeln!(f, "FAILED {} - {}", outcome.case, e)?;
                }
            }
        }
        write!(
            f,
            "{} passed, {} failed",
            self.outcomes.len() - failed,
            failed
        )
    }
}
