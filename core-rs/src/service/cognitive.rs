// Aliases, cognitive tests and performance records

use std::path::{Component, Path};
use tracing::info;

use super::messages::*;
use super::{require, OntologyService};
use crate::envelope::{NoData, Response, Trace};
use crate::errors::{BridgeError, Result};
use crate::ontology::mint_local_name;
use crate::ontology::query::COGNITIVE_TEST_PERFORMED;

const PERFORMANCE_OUT_OF_RANGE: &str = "Error, one or more arguments not provided or out of range. \
     Test score is >=0 and <=100 and timestamp is positive integers";
const TEST_OUT_OF_RANGE: &str = "Error, one or more arguments not provided or out of range. \
     Test variation and test difficulty are positive integers >0";
const NO_PERFORMANCE_RECORDS: &str =
    "No performance records exist for the user or invalid user or invalid test type";

const MIN_SCORE: i64 = 0;
const MAX_SCORE: i64 = 100;

impl OntologyService {
    /// Alias of a user, created on first use
    pub fn create_ontology_alias(&self, request: &CreateAliasRequest) -> Response<AliasData> {
        let result = require(&request.username, "Error, empty username")
            .and_then(|_| self.aliases.get_or_create(&request.username))
            .map(|ontology_alias| AliasData { ontology_alias });
        Response::from_result(result, Trace::new())
    }

    /// Record one test performance of a patient
    pub fn record_user_performance(&self, request: &RecordPerformanceRequest) -> Response<PerformanceEntryData> {
        let mut trace = Trace::new();
        let result = self.try_record_user_performance(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_record_user_performance(
        &self,
        request: &RecordPerformanceRequest,
        trace: &mut Trace,
    ) -> Result<PerformanceEntryData> {
        if request.test.trim().is_empty()
            || request.patient_ontology_alias.trim().is_empty()
            || !(MIN_SCORE..=MAX_SCORE).contains(&request.score)
            || request.timestamp < 1
        {
            return Err(BridgeError::MalformedInput(PERFORMANCE_OUT_OF_RANGE.to_string()));
        }

        let check = self
            .builder
            .performance_preconditions(&request.patient_ontology_alias, &request.test)?;
        let entry = mint_local_name(COGNITIVE_TEST_PERFORMED);
        let insert = self.builder.record_performance(
            &entry,
            &request.patient_ontology_alias,
            &request.test,
            request.timestamp,
            request.score,
        )?;

        if !self.holds(&check, trace)? {
            return Err(BridgeError::NoSolutions(
                "Test performance entry insertion into ontology FAILED, either invalid test or patient alias"
                    .to_string(),
            ));
        }
        self.apply(&insert, trace)?;
        info!("recorded performance {} for {}", entry, request.patient_ontology_alias);

        self.after_mutation(trace);
        Ok(PerformanceEntryData {
            cognitive_test_performance_entry: self.builder.qualify(&entry, "performance entry")?,
        })
    }

    /// Define a new cognitive test backed by an asset file
    pub fn create_cognitive_test(&self, request: &CreateCognitiveTestRequest) -> Response<CreatedTestData> {
        let mut trace = Trace::new();
        let result = self.try_create_cognitive_test(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_create_cognitive_test(
        &self,
        request: &CreateCognitiveTestRequest,
        trace: &mut Trace,
    ) -> Result<CreatedTestData> {
        if request.test_type.trim().is_empty()
            || request.test_difficulty < 1
            || request.test_path.trim().is_empty()
            || request.test_subtype.trim().is_empty()
        {
            return Err(BridgeError::MalformedInput(TEST_OUT_OF_RANGE.to_string()));
        }

        self.check_test_asset(&request.test_path)?;

        let check = self
            .builder
            .cognitive_test_preconditions(&request.test_type, &request.test_subtype)?;
        let test = mint_local_name(&self.builder.local_part(&request.test_type, "test_type")?);
        let insert = self.builder.create_cognitive_test(
            &test,
            &request.test_type,
            request.test_difficulty,
            &request.test_path,
            &request.test_subtype,
            &request.supported_languages,
        )?;

        if !self.holds(&check, trace)? {
            return Err(BridgeError::NoSolutions(
                "Test insertion into ontology FAILED, possible error is test type/subtype invalid".to_string(),
            ));
        }
        self.apply(&insert, trace)?;
        info!("created cognitive test {}", test);

        self.after_mutation(trace);
        Ok(CreatedTestData {
            test_name: self.builder.qualify(&test, "test")?,
        })
    }

    /// The asset must exist under the assets root
    fn check_test_asset(&self, test_path: &str) -> Result<()> {
        let relative = Path::new(test_path.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(BridgeError::MalformedInput(format!(
                "test_path '{}' must stay under the assets root",
                test_path
            )));
        }

        let asset = self.config.assets_root.join(relative);
        if !asset.is_file() {
            return Err(BridgeError::FileNotFound(format!(
                "Test file does not exist in provided file path: '{}'",
                test_path
            )));
        }
        Ok(())
    }

    /// Tests of a type available in a language
    pub fn cognitive_tests_of_type(&self, request: &TestsOfTypeRequest) -> Response<TestsOfTypeData> {
        let mut trace = Trace::new();
        let result = self.try_cognitive_tests_of_type(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_cognitive_tests_of_type(&self, request: &TestsOfTypeRequest, trace: &mut Trace) -> Result<TestsOfTypeData> {
        require(&request.test_type, "Error, test_type empty")?;
        require(&request.test_language, "Error, language empty")?;

        let query = self
            .builder
            .cognitive_tests_of_type(&request.test_type, &request.test_language)?;
        let bindings = self
            .execute(&query, &["B", "Path", "Dif", "Sub"], trace)?
            .deduplicated();

        if bindings.is_empty() {
            return Err(BridgeError::NoSolutions("No tests of given type exist".to_string()));
        }

        Ok(TestsOfTypeData {
            tests: bindings.column("B"),
            difficulty: bindings.column("Dif"),
            file_paths: bindings.column("Path"),
            subtype: bindings.column("Sub"),
        })
    }

    /// A patient's performance on tests of a type, oldest first
    pub fn user_performance_cognitive_tests(&self, request: &UserPerformanceRequest) -> Response<UserPerformanceData> {
        let mut trace = Trace::new();
        let result = self.try_user_performance(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_user_performance(&self, request: &UserPerformanceRequest, trace: &mut Trace) -> Result<UserPerformanceData> {
        require(&request.ontology_alias, "Error, ontology alias empty")?;
        require(&request.test_type, "Error, test type empty")?;

        let query = self
            .builder
            .user_performance(&request.ontology_alias, &request.test_type)?;
        let bindings = self.execute(&query, &["B", "Dif", "Timestamp", "SC", "P", "SubType"], trace)?;

        if bindings.is_empty() {
            return Err(BridgeError::NoSolutions(NO_PERFORMANCE_RECORDS.to_string()));
        }

        Ok(UserPerformanceData {
            tests: bindings.column("B"),
            scores: bindings.column("SC"),
            difficulty: bindings.column("Dif"),
            timestamps: bindings.column("Timestamp"),
            subtypes: bindings.column("SubType"),
        })
    }

    /// Remove a user's performance records, all or of one test type
    pub fn clear_user_performance(&self, request: &ClearPerformanceRequest) -> Response<NoData> {
        let mut trace = Trace::new();
        let result = self.try_clear_user_performance(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_clear_user_performance(&self, request: &ClearPerformanceRequest, trace: &mut Trace) -> Result<NoData> {
        require(&request.username, "Error, empty username")?;

        let test_type = Some(request.test_type.as_str())
            .filter(|t| !t.trim().is_empty())
            .map(|t| self.builder.local_part(t, "test_type"))
            .transpose()?;
        let alias = self.aliases.get_or_create(&request.username)?;

        let records = self.builder.performance_records(&alias, test_type.as_deref())?;
        let delete = self.builder.clear_performance(&alias, test_type.as_deref())?;

        let existing = self.execute(&records, &["P"], trace)?;
        if existing.is_empty() {
            return Err(BridgeError::NoSolutions(NO_PERFORMANCE_RECORDS.to_string()));
        }
        self.apply(&delete, trace)?;
        info!("cleared {} performance record(s) of {}", existing.rows().len(), alias);

        self.after_mutation(trace);
        Ok(NoData {})
    }
}
