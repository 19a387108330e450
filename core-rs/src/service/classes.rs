// Class hierarchy queries and user-owned instances

use tracing::info;

use super::messages::*;
use super::{require, OntologyService};
use crate::envelope::{Response, Trace};
use crate::errors::{BridgeError, Result};
use crate::ontology::{mint_local_name, Bindings, QualifiedName};

/// `ontology_class` value matching every class
pub const ANY_CLASS: &str = "*";

fn class_missing(class: &str) -> BridgeError {
    BridgeError::NoSolutions(format!("Class: {} does not exist", class))
}

impl OntologyService {
    /// Subclasses of a class, direct or transitive
    pub fn subclasses_of(&self, request: &ClassQueryRequest) -> Response<ClassesData> {
        let mut trace = Trace::new();
        let result = self.try_class_query(request, false, &mut trace);
        Response::from_result(result, trace)
    }

    /// Superclasses of a class, direct or transitive
    pub fn superclasses_of(&self, request: &ClassQueryRequest) -> Response<ClassesData> {
        let mut trace = Trace::new();
        let result = self.try_class_query(request, true, &mut trace);
        Response::from_result(result, trace)
    }

    fn class_bindings(&self, class: &str, upward: bool, recursive: bool, trace: &mut Trace) -> Result<Bindings> {
        let query = if upward {
            self.builder.superclasses_of(class, recursive)?
        } else {
            self.builder.subclasses_of(class, recursive)?
        };

        let bindings = self.execute(&query, &["A"], trace)?;
        if !bindings.has_solutions() {
            return Err(class_missing(class));
        }
        Ok(bindings.without_file_uris().deduplicated())
    }

    fn try_class_query(&self, request: &ClassQueryRequest, upward: bool, trace: &mut Trace) -> Result<ClassesData> {
        require(&request.ontology_class, "Error, empty ontology class")?;

        let bindings = self.class_bindings(&request.ontology_class, upward, request.recursive, trace)?;
        Ok(ClassesData {
            results: bindings.column("A"),
        })
    }

    /// Whether `parent_class` is an ancestor of `child_class`
    pub fn is_subsuperclass_of(&self, request: &SubSuperclassRequest) -> Response<IsSubclassData> {
        let mut trace = Trace::new();
        let result = self.try_is_subsuperclass_of(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_is_subsuperclass_of(&self, request: &SubSuperclassRequest, trace: &mut Trace) -> Result<IsSubclassData> {
        require(&request.parent_class, "Error, empty ontology class")?;
        require(&request.child_class, "Error, empty other class")?;

        let child = self.builder.local_part(&request.child_class, "child_class")?;
        let bindings = self.class_bindings(&request.parent_class, false, request.recursive, trace)?;

        Ok(IsSubclassData {
            result: bindings.local_names("A").iter().any(|name| *name == child),
        })
    }

    /// Create an individual of a class owned by the caller
    pub fn create_instance(&self, request: &CreateInstanceRequest) -> Response<InstanceData> {
        let mut trace = Trace::new();
        let result = self.try_create_instance(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_create_instance(&self, request: &CreateInstanceRequest, trace: &mut Trace) -> Result<InstanceData> {
        require(&request.username, "Error, empty username")?;
        require(&request.ontology_class, "Error, empty ontology class")?;

        let class = self.builder.local_part(&request.ontology_class, "ontology_class")?;
        let alias = self.aliases.get_or_create(&request.username)?;

        let check = self.builder.instance_preconditions(&class, &alias)?;
        let instance = mint_local_name(&class);
        let insert = self.builder.create_instance(&instance, &class, &alias)?;

        if !self.holds(&check, trace)? {
            return Err(BridgeError::NoSolutions(format!(
                "Class: {} does not exist probably.. or ontology_alias for user exists in the user directory and not in the ontology",
                request.ontology_class
            )));
        }
        self.apply(&insert, trace)?;

        let qualified = self.builder.qualify(&instance, "instance")?;
        let instance_name = QualifiedName::split(&qualified)?.into_local();
        info!("created instance {} for {}", instance_name, alias);

        self.after_mutation(trace);
        Ok(InstanceData { instance_name })
    }

    /// Instances owned by a user, of one class or of any (`*`)
    pub fn user_instances_of_class(&self, request: &UserInstancesRequest) -> Response<ClassesData> {
        let mut trace = Trace::new();
        let result = self.try_user_instances_of_class(request, &mut trace);
        Response::from_result(result, trace)
    }

    fn try_user_instances_of_class(&self, request: &UserInstancesRequest, trace: &mut Trace) -> Result<ClassesData> {
        require(&request.username, "Error, empty username")?;
        require(&request.ontology_class, "Error, empty ontology class")?;

        let class = Some(request.ontology_class.as_str())
            .filter(|c| *c != ANY_CLASS)
            .map(|c| self.builder.local_part(c, "ontology_class"))
            .transpose()?;
        let alias = self.aliases.get_or_create(&request.username)?;

        let query = self.builder.user_instances(&alias, class.as_deref())?;
        let bindings = self.execute(&query, &["A"], trace)?;
        if bindings.is_empty() {
            return Err(BridgeError::NoSolutions("User has no instances".to_string()));
        }

        Ok(ClassesData {
            results: bindings.without_file_uris().deduplicated().column("A"),
        })
    }
}
