// Explicit ontology dump/load

use super::messages::OntologyFileRequest;
use super::{require, OntologyService};
use crate::envelope::{NoData, Response, Trace};
use crate::errors::Result;

impl OntologyService {
    /// Serialize the store to a path under the ontology root
    pub fn dump_ontology(&self, request: &OntologyFileRequest) -> Response<NoData> {
        Response::from_result(self.try_dump(request), Trace::new())
    }

    fn try_dump(&self, request: &OntologyFileRequest) -> Result<NoData> {
        require(&request.file_url, "Empty file path")?;
        self.persistence.dump(&request.file_url)?;
        Ok(NoData {})
    }

    /// Merge a file under the ontology root into the store
    pub fn load_ontology(&self, request: &OntologyFileRequest) -> Response<NoData> {
        Response::from_result(self.try_load(request), Trace::new())
    }

    fn try_load(&self, request: &OntologyFileRequest) -> Result<NoData> {
        require(&request.file_url, "Empty file path")?;
        self.persistence.load(&request.file_url)?;
        Ok(NoData {})
    }
}
