/**
 * query.rs
 * Query types and builders for SPARQL
 *
 * Every caller-supplied name is validated and qualified with the ontology
 * namespace before it is interpolated; string literals are checked for
 * quote and escape characters. Builders never touch the store.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use super::names::SEPARATOR;
use crate::errors::{BridgeError, Result};

const PREFIXES: &str = r#"PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX owl: <http://www.w3.org/2002/07/owl#>
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>
"#;

/// Default ontology namespace
pub const DEFAULT_NAMESPACE: &str = "http://knowrob.org/kb/knowrob.owl#";

// Vocabulary
pub const PERSON: &str = "Person";
pub const COGNITIVE_TESTS: &str = "CognitiveTests";
pub const COGNITIVE_TEST_PERFORMED: &str = "CognitiveTestPerformed";
const PERFORMED_PATIENT: &str = "cognitiveTestPerformedPatient";
const PERFORMED_TEST_NAME: &str = "cognitiveTestPerformedTestName";
const PERFORMED_TIMESTAMP: &str = "cognitiveTestPerformedTimestamp";
const PERFORMED_SCORE: &str = "cognitiveTestPerformedScore";
const TEST_DIFFICULTY: &str = "cognitiveTestDifficulty";
const TEST_FILE_PATH: &str = "cognitiveTestFilePath";
const TEST_SUBTYPE: &str = "cognitiveTestSubType";
const SUPPORTED_LANGUAGES: &str = "supportedLanguages";
const BELONGS_TO_USER: &str = "belongsToUser";

static LOCAL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.\-]*$").expect("valid local name pattern"));

/// Characters that may never appear inside a quoted literal
const FORBIDDEN_IN_LITERAL: &[char] = &['"', '\'', '\\', '\n', '\r'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryForm {
    Select,
    Ask,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparqlQuery {
    form: QueryForm,
    query: String,
}

impl SparqlQuery {
    pub fn new(form: QueryForm, query: impl Into<String>) -> Self {
        Self {
            form,
            query: query.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    pub fn form(&self) -> QueryForm {
        self.form
    }

    pub fn is_update(&self) -> bool {
        self.form == QueryForm::Update
    }
}

impl std::fmt::Display for SparqlQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.query)
    }
}

/// Builds SPARQL for each bridge operation within one namespace
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    namespace: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

impl QueryBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Validate a caller-supplied name and return its fully qualified form.
    ///
    /// Accepts a bare local name (`Oven`) or one already carrying this
    /// builder's namespace.
    ///
    /// # Example
    /// ```
    /// use ontobridge_core::ontology::QueryBuilder;
    ///
    /// let builder = QueryBuilder::new("http://x.org/onto#");
    /// assert_eq!(builder.qualify("Oven", "class").unwrap(), "http://x.org/onto#Oven");
    /// assert!(builder.qualify("Oven'> ?s ?p", "class").is_err());
    /// ```
    pub fn qualify(&self, name: &str, field: &str) -> Result<String> {
        let local = name.strip_prefix(self.namespace.as_str()).unwrap_or(name);

        if local.is_empty() {
            return Err(BridgeError::MalformedInput(format!("{} is empty", field)));
        }

        if local.contains(SEPARATOR) || !LOCAL_NAME.is_match(local) {
            return Err(BridgeError::MalformedInput(format!(
                "{} '{}' contains characters not allowed in an ontology name",
                field, name
            )));
        }

        Ok(format!("{}{}", self.namespace, local))
    }

    /// Validated local part of a caller-supplied name
    pub fn local_part(&self, name: &str, field: &str) -> Result<String> {
        let qualified = self.qualify(name, field)?;
        Ok(qualified[self.namespace.len()..].to_string())
    }

    /// Qualified name wrapped as a SPARQL IRI term
    fn iri(&self, name: &str, field: &str) -> Result<String> {
        Ok(format!("<{}>", self.qualify(name, field)?))
    }

    /// IRI for a trusted vocabulary term
    fn term(&self, local: &str) -> String {
        format!("<{}{}>", self.namespace, local)
    }

    /// Quoted string literal
    fn literal(value: &str, field: &str) -> Result<String> {
        if value.is_empty() {
            return Err(BridgeError::MalformedInput(format!("{} is empty", field)));
        }
        if value.contains(FORBIDDEN_IN_LITERAL) {
            return Err(BridgeError::MalformedInput(format!(
                "{} contains quote, escape or line-break characters",
                field
            )));
        }
        Ok(format!("\"{}\"", value))
    }

    fn integer(value: i64) -> String {
        format!("\"{}\"^^xsd:integer", value)
    }

    fn select(body: String) -> SparqlQuery {
        SparqlQuery::new(QueryForm::Select, format!("{}{}", PREFIXES, body))
    }

    fn ask(body: String) -> SparqlQuery {
        SparqlQuery::new(QueryForm::Ask, format!("{}{}", PREFIXES, body))
    }

    fn update(body: String) -> SparqlQuery {
        SparqlQuery::new(QueryForm::Update, format!("{}{}", PREFIXES, body))
    }

    // =========================================================================
    // Individuals
    // =========================================================================

    /// Assert a new individual `local` of `class`
    pub fn create_individual(&self, class: &str, local: &str) -> Result<SparqlQuery> {
        let class = self.iri(class, "class")?;
        let individual = self.iri(local, "individual")?;
        Ok(Self::update(format!(
            "INSERT DATA {{\n    {} rdf:type {} .\n}}\n",
            individual, class
        )))
    }

    /// Retract every statement about an individual
    pub fn retract_individual(&self, local: &str) -> Result<SparqlQuery> {
        let individual = self.iri(local, "individual")?;
        Ok(Self::update(format!(
            "DELETE WHERE {{\n    {} ?p ?o .\n}}\n",
            individual
        )))
    }

    /// All individuals of a class (binds ?A)
    pub fn individuals_of(&self, class: &str) -> Result<SparqlQuery> {
        let class = self.iri(class, "class")?;
        Ok(Self::select(format!(
            "SELECT ?A\nWHERE {{\n    ?A rdf:type {} .\n}}\nORDER BY ?A\n",
            class
        )))
    }

    // =========================================================================
    // Class hierarchy
    // =========================================================================

    /// Subclasses of a class (binds ?A). A single row with ?A unbound means
    /// the class exists but has no subclasses.
    pub fn subclasses_of(&self, class: &str, recursive: bool) -> Result<SparqlQuery> {
        let class = self.iri(class, "ontology_class")?;
        let path = if recursive { "rdfs:subClassOf+" } else { "rdfs:subClassOf" };
        Ok(Self::select(format!(
            r#"SELECT ?A
WHERE {{
    {class} rdf:type owl:Class .
    OPTIONAL {{
        ?A {path} {class} .
        FILTER (?A != {class})
    }}
}}
"#,
            class = class,
            path = path
        )))
    }

    /// Superclasses of a class (binds ?A), same shape as `subclasses_of`
    pub fn superclasses_of(&self, class: &str, recursive: bool) -> Result<SparqlQuery> {
        let class = self.iri(class, "ontology_class")?;
        let path = if recursive { "rdfs:subClassOf+" } else { "rdfs:subClassOf" };
        Ok(Self::select(format!(
            r#"SELECT ?A
WHERE {{
    {class} rdf:type owl:Class .
    OPTIONAL {{
        {class} {path} ?A .
        FILTER (?A != {class})
    }}
}}
"#,
            class = class,
            path = path
        )))
    }

    // =========================================================================
    // Cognitive tests
    // =========================================================================

    /// Holds when `test_type` is a cognitive test class and `subtype` one of its subclasses
    pub fn cognitive_test_preconditions(&self, test_type: &str, subtype: &str) -> Result<SparqlQuery> {
        let test_type = self.iri(test_type, "test_type")?;
        let subtype = self.iri(subtype, "test_subtype")?;
        Ok(Self::ask(format!(
            "ASK {{\n    {} rdfs:subClassOf+ {} .\n    {} rdfs:subClassOf+ {} .\n}}\n",
            test_type,
            self.term(COGNITIVE_TESTS),
            subtype,
            test_type
        )))
    }

    pub fn create_cognitive_test(
        &self,
        test: &str,
        test_type: &str,
        difficulty: i64,
        file_path: &str,
        subtype: &str,
        languages: &[String],
    ) -> Result<SparqlQuery> {
        let test = self.iri(test, "test")?;
        let test_type = self.iri(test_type, "test_type")?;
        let subtype = self.iri(subtype, "test_subtype")?;
        let file_path = Self::literal(file_path, "test_path")?;

        let mut body = format!(
            "INSERT DATA {{\n    {test} rdf:type {test_type} ;\n        {dif} {difficulty} ;\n        {path} {file_path} ;\n        {sub} {subtype} .\n",
            test = test,
            test_type = test_type,
            dif = self.term(TEST_DIFFICULTY),
            difficulty = Self::integer(difficulty),
            path = self.term(TEST_FILE_PATH),
            file_path = file_path,
            sub = self.term(TEST_SUBTYPE),
            subtype = subtype,
        );
        for language in languages {
            body.push_str(&format!(
                "    {} {} {} .\n",
                test,
                self.term(SUPPORTED_LANGUAGES),
                self.iri(language, "supported_languages")?
            ));
        }
        body.push_str("}\n");

        Ok(Self::update(body))
    }

    /// Tests of a type available in a language (binds ?B ?Path ?Dif ?Sub)
    pub fn cognitive_tests_of_type(&self, test_type: &str, language: &str) -> Result<SparqlQuery> {
        let test_type = self.iri(test_type, "test_type")?;
        let language = self.iri(language, "test_language")?;
        Ok(Self::select(format!(
            r#"SELECT ?B ?Path ?Dif ?Sub
WHERE {{
    ?B rdf:type {test_type} ;
       {path} ?Path ;
       {dif} ?Dif ;
       {sub} ?Sub ;
       {lang} {language} .
}}
ORDER BY ?B
"#,
            test_type = test_type,
            path = self.term(TEST_FILE_PATH),
            dif = self.term(TEST_DIFFICULTY),
            sub = self.term(TEST_SUBTYPE),
            lang = self.term(SUPPORTED_LANGUAGES),
            language = language
        )))
    }

    // =========================================================================
    // Performance records
    // =========================================================================

    /// Holds when the patient exists and `test` is an individual cognitive test
    pub fn performance_preconditions(&self, alias: &str, test: &str) -> Result<SparqlQuery> {
        let alias = self.iri(alias, "patient_ontology_alias")?;
        let test = self.iri(test, "test")?;
        Ok(Self::ask(format!(
            "ASK {{\n    {} rdf:type {} .\n    {} rdf:type ?type .\n    ?type rdfs:subClassOf+ {} .\n}}\n",
            alias,
            self.term(PERSON),
            test,
            self.term(COGNITIVE_TESTS)
        )))
    }

    pub fn record_performance(
        &self,
        entry: &str,
        alias: &str,
        test: &str,
        timestamp: i64,
        score: i64,
    ) -> Result<SparqlQuery> {
        let entry = self.iri(entry, "performance entry")?;
        let alias = self.iri(alias, "patient_ontology_alias")?;
        let test = self.iri(test, "test")?;
        Ok(Self::update(format!(
            r#"INSERT DATA {{
    {entry} rdf:type {class} ;
        {patient} {alias} ;
        {test_name} {test} ;
        {ts} {timestamp} ;
        {sc} {score} .
}}
"#,
            entry = entry,
            class = self.term(COGNITIVE_TEST_PERFORMED),
            patient = self.term(PERFORMED_PATIENT),
            alias = alias,
            test_name = self.term(PERFORMED_TEST_NAME),
            test = test,
            ts = self.term(PERFORMED_TIMESTAMP),
            timestamp = Self::integer(timestamp),
            sc = self.term(PERFORMED_SCORE),
            score = Self::integer(score)
        )))
    }

    /// A user's performances on tests of a type
    /// (binds ?B ?Dif ?Timestamp ?SC ?P ?SubType, oldest first)
    pub fn user_performance(&self, alias: &str, test_type: &str) -> Result<SparqlQuery> {
        let alias = self.iri(alias, "ontology_alias")?;
        let test_type = self.iri(test_type, "test_type")?;
        Ok(Self::select(format!(
            r#"SELECT ?B ?Dif ?Timestamp ?SC ?P ?SubType
WHERE {{
    ?P rdf:type {class} ;
       {patient} {alias} ;
       {test_name} ?B ;
       {ts} ?Timestamp ;
       {sc} ?SC .
    ?B rdf:type {test_type} ;
       {dif} ?Dif ;
       {sub} ?SubType .
}}
ORDER BY ASC(?Timestamp)
"#,
            class = self.term(COGNITIVE_TEST_PERFORMED),
            patient = self.term(PERFORMED_PATIENT),
            alias = alias,
            test_name = self.term(PERFORMED_TEST_NAME),
            ts = self.term(PERFORMED_TIMESTAMP),
            sc = self.term(PERFORMED_SCORE),
            test_type = test_type,
            dif = self.term(TEST_DIFFICULTY),
            sub = self.term(TEST_SUBTYPE)
        )))
    }

    fn performance_pattern(&self, alias: &str, test_type: Option<&str>) -> Result<String> {
        let alias = self.iri(alias, "ontology_alias")?;
        let mut pattern = format!("    ?P {} {} .\n", self.term(PERFORMED_PATIENT), alias);
        if let Some(test_type) = test_type {
            let test_type = self.iri(test_type, "test_type")?;
            pattern.push_str(&format!(
                "    ?P {} ?B .\n    ?B rdf:type {} .\n",
                self.term(PERFORMED_TEST_NAME),
                test_type
            ));
        }
        Ok(pattern)
    }

    /// Performance entries of a user, optionally limited to one test type (binds ?P)
    pub fn performance_records(&self, alias: &str, test_type: Option<&str>) -> Result<SparqlQuery> {
        let pattern = self.performance_pattern(alias, test_type)?;
        Ok(Self::select(format!("SELECT DISTINCT ?P\nWHERE {{\n{}}}\n", pattern)))
    }

    /// Retract the performance entries matched by `performance_records`
    pub fn clear_performance(&self, alias: &str, test_type: Option<&str>) -> Result<SparqlQuery> {
        let pattern = self.performance_pattern(alias, test_type)?;
        Ok(Self::update(format!(
            "DELETE {{\n    ?P ?p ?o .\n}}\nWHERE {{\n{}    ?P ?p ?o .\n}}\n",
            pattern
        )))
    }

    // =========================================================================
    // User-owned instances
    // =========================================================================

    /// Holds when `class` exists and the alias is a known person
    pub fn instance_preconditions(&self, class: &str, alias: &str) -> Result<SparqlQuery> {
        let class = self.iri(class, "ontology_class")?;
        let alias = self.iri(alias, "ontology_alias")?;
        Ok(Self::ask(format!(
            "ASK {{\n    {} rdf:type owl:Class .\n    {} rdf:type {} .\n}}\n",
            class,
            alias,
            self.term(PERSON)
        )))
    }

    /// Assert an individual of `class` owned by `alias`
    pub fn create_instance(&self, local: &str, class: &str, alias: &str) -> Result<SparqlQuery> {
        let individual = self.iri(local, "individual")?;
        let class = self.iri(class, "ontology_class")?;
        let alias = self.iri(alias, "ontology_alias")?;
        Ok(Self::update(format!(
            "INSERT DATA {{\n    {} rdf:type {} ;\n        {} {} .\n}}\n",
            individual,
            class,
            self.term(BELONGS_TO_USER),
            alias
        )))
    }

    /// Instances owned by `alias`, optionally of one class (binds ?A)
    pub fn user_instances(&self, alias: &str, class: Option<&str>) -> Result<SparqlQuery> {
        let alias = self.iri(alias, "ontology_alias")?;
        let class_filter = match class {
            Some(class) => format!("    ?A rdf:type {} .\n", self.iri(class, "ontology_class")?),
            None => String::new(),
        };
        Ok(Self::select(format!(
            "SELECT DISTINCT ?A\nWHERE {{\n    ?A {} {} .\n{}}}\nORDER BY ?A\n",
            self.term(BELONGS_TO_USER),
            alias,
            class_filter
        )))
    }
}
