// SPDX-License-Identifier: AGPL-3.0-or-later
// PulseDB - Streaming Telemetry Log Engine
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! gRPC server implementation for the log-table service
//!
//! The transport multiplexes requests over shared connections, so the
//! handler identity the original design bound to a connection travels
//! explicitly: `register_handler` issues an id from the registry and
//! every subsequent request carries it. Each id resolves to a
//! [`Session`] holding the current-table handle and cursor maps.

use crate::error::RpcError;
use crate::proto::log_table_service_server::{LogTableService, LogTableServiceServer};
use crate::proto::{self, IteratorHandle};
use crate::session::{CursorDescriptor, CursorKind, Page, PayloadKind, Session};
use dashmap::DashMap;
use parking_lot::Mutex;
use pulsedb_core::schema::{Schema, SchemaBuilder};
use pulsedb_core::types::ColumnType;
use pulsedb_core::RecordBatchBuilder;
use pulsedb_engine::store::Store;
use pulsedb_engine::table::StorageMode;
use pulsedb_engine::HandlerRegistry;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::info;

/// Log-table gRPC server
pub struct LogTableServer {
    store: Arc<Store>,
    registry: Arc<HandlerRegistry>,
    sessions: DashMap<u64, Mutex<Session>>,
}

impl LogTableServer {
    pub fn new(store: Arc<Store>, registry: Arc<HandlerRegistry>) -> Self {
        Self {
            store,
            registry,
            sessions: DashMap::new(),
        }
    }

    /// Create the gRPC service
    pub fn into_service(self) -> LogTableServiceServer<Self> {
        LogTableServiceServer::new(self)
    }

    /// Run `f` against the session registered under `handler_id`
    fn with_session<T>(
        &self,
        handler_id: u64,
        f: impl FnOnce(&mut Session) -> Result<T, RpcError>,
    ) -> Result<T, Status> {
        let entry = self.sessions.get(&handler_id).ok_or_else(|| {
            Status::from(RpcError::Management(format!(
                "Handler {} is not registered",
                handler_id
            )))
        })?;
        let mut session = entry.lock();
        f(&mut session).map_err(Status::from)
    }
}

/// Convert a wire schema into an engine schema
fn convert_schema(def: &proto::SchemaDef) -> Result<Schema, RpcError> {
    let mut builder = SchemaBuilder::new();
    for col in &def.columns {
        let kind = proto::ColumnKind::try_from(col.kind)
            .map_err(|_| RpcError::Management(format!("Unknown column kind {}", col.kind)))?;
        let ty = match kind {
            proto::ColumnKind::Bool => ColumnType::Bool,
            proto::ColumnKind::Char => ColumnType::Char,
            proto::ColumnKind::Short => ColumnType::Short,
            proto::ColumnKind::Int => ColumnType::Int,
            proto::ColumnKind::Long => ColumnType::Long,
            proto::ColumnKind::Float => ColumnType::Float,
            proto::ColumnKind::Double => ColumnType::Double,
            proto::ColumnKind::String => ColumnType::String(col.size as usize),
            proto::ColumnKind::Unspecified => {
                return Err(RpcError::Management(format!(
                    "Column {} has unspecified type",
                    col.name
                )));
            }
        };
        builder = builder.add_column(ty, col.name.clone());
    }
    builder.build().map_err(RpcError::management)
}

/// Convert an engine schema (including the implicit timestamp column)
/// back to its wire form
fn schema_to_proto(schema: &Schema) -> proto::SchemaDef {
    let columns = schema
        .columns()
        .iter()
        .map(|col| {
            let (kind, size) = match col.ty {
                ColumnType::Bool => (proto::ColumnKind::Bool, 0),
                ColumnType::Char => (proto::ColumnKind::Char, 0),
                ColumnType::Short => (proto::ColumnKind::Short, 0),
                ColumnType::Int => (proto::ColumnKind::Int, 0),
                ColumnType::Long => (proto::ColumnKind::Long, 0),
                ColumnType::Float => (proto::ColumnKind::Float, 0),
                ColumnType::Double => (proto::ColumnKind::Double, 0),
                ColumnType::String(n) => (proto::ColumnKind::String, n as u32),
            };
            proto::ColumnDef {
                kind: kind as i32,
                name: col.name.clone(),
                size,
            }
        })
        .collect();
    proto::SchemaDef { columns }
}

fn page_to_handle(page: Page) -> IteratorHandle {
    let payload = match page.descriptor.payload {
        PayloadKind::Record => proto::DataKind::Record,
        PayloadKind::Alert => proto::DataKind::Alert,
    };
    let kind = match page.descriptor.kind {
        CursorKind::Adhoc => proto::IteratorKind::Adhoc,
        CursorKind::Predef => proto::IteratorKind::Predef,
        CursorKind::Combined => proto::IteratorKind::Combined,
        CursorKind::Alerts => proto::IteratorKind::Alerts,
    };
    IteratorHandle {
        descriptor: Some(proto::IteratorDescriptor {
            data_type: payload as i32,
            handler_id: page.descriptor.handler_id,
            id: page.descriptor.id,
            kind: kind as i32,
        }),
        data: page.data,
        num_entries: page.num_entries,
        has_more: page.has_more,
    }
}

fn descriptor_from_proto(desc: &proto::IteratorDescriptor) -> Result<CursorDescriptor, RpcError> {
    let kind = match proto::IteratorKind::try_from(desc.kind) {
        Ok(proto::IteratorKind::Adhoc) => CursorKind::Adhoc,
        Ok(proto::IteratorKind::Predef) => CursorKind::Predef,
        Ok(proto::IteratorKind::Combined) => CursorKind::Combined,
        Ok(proto::IteratorKind::Alerts) => CursorKind::Alerts,
        _ => {
            return Err(RpcError::InvalidOperation(format!(
                "Unknown iterator kind {}",
                desc.kind
            )));
        }
    };
    let payload = match proto::DataKind::try_from(desc.data_type) {
        Ok(proto::DataKind::Alert) => PayloadKind::Alert,
        _ => PayloadKind::Record,
    };
    Ok(CursorDescriptor {
        payload,
        handler_id: desc.handler_id,
        id: desc.id,
        kind,
    })
}

#[tonic::async_trait]
impl LogTableService for LogTableServer {
    async fn register_handler(
        &self,
        _request: Request<proto::RegisterHandlerRequest>,
    ) -> Result<Response<proto::RegisterHandlerResponse>, Status> {
        let handler_id = self
            .registry
            .register()
            .map_err(|e| Status::from(RpcError::management(e)))?;
        self.sessions.insert(handler_id, Mutex::new(Session::new(handler_id)));
        info!(handler_id, "registered handler");
        Ok(Response::new(proto::RegisterHandlerResponse { handler_id }))
    }

    async fn deregister_handler(
        &self,
        request: Request<proto::DeregisterHandlerRequest>,
    ) -> Result<Response<proto::DeregisterHandlerResponse>, Status> {
        let handler_id = request.into_inner().handler_id;
        if self.sessions.remove(&handler_id).is_none() {
            return Err(Status::from(RpcError::Management(format!(
                "Handler {} is not registered",
                handler_id
            ))));
        }
        self.registry
            .deregister(handler_id)
            .map_err(|e| Status::from(RpcError::management(e)))?;
        info!(handler_id, "deregistered handler");
        Ok(Response::new(proto::DeregisterHandlerResponse {}))
    }

    async fn create_table(
        &self,
        request: Request<proto::CreateTableRequest>,
    ) -> Result<Response<proto::CreateTableResponse>, Status> {
        let req = request.into_inner();
        let schema = convert_schema(req.schema.as_ref().ok_or_else(|| {
            Status::from(RpcError::Management("Missing schema".into()))
        })?)
        .map_err(Status::from)?;
        let mode = StorageMode::from_id(req.mode).ok_or_else(|| {
            Status::from(RpcError::Management(format!(
                "Unknown storage mode {}",
                req.mode
            )))
        })?;
        self.with_session(req.handler_id, |_| Ok(()))?;
        self.store
            .add_table(&req.name, schema, mode)
            .map_err(|e| Status::from(RpcError::management(e)))?;
        Ok(Response::new(proto::CreateTableResponse {}))
    }

    async fn set_current_table(
        &self,
        request: Request<proto::SetCurrentTableRequest>,
    ) -> Result<Response<proto::SetCurrentTableResponse>, Status> {
        let req = request.into_inner();
        let table = self
            .store
            .get_table(&req.name)
            .map_err(|e| Status::from(RpcError::management(e)))?;
        let schema = schema_to_proto(table.schema());
        self.with_session(req.handler_id, |session| {
            session.set_table(table.clone());
            Ok(())
        })?;
        Ok(Response::new(proto::SetCurrentTableResponse {
            schema: Some(schema),
        }))
    }

    async fn add_index(
        &self,
        request: Request<proto::AddIndexRequest>,
    ) -> Result<Response<proto::AddIndexResponse>, Status> {
        let req = request.into_inner();
        self.with_session(req.handler_id, |session| {
            session
                .table()?
                .add_index(&req.field_name, req.bucket_size)
                .map_err(RpcError::management)
        })?;
        Ok(Response::new(proto::AddIndexResponse {}))
    }

    async fn remove_index(
        &self,
        request: Request<proto::RemoveIndexRequest>,
    ) -> Result<Response<proto::RemoveIndexResponse>, Status> {
        let req = request.into_inner();
        self.with_session(req.handler_id, |session| {
            session
                .table()?
                .remove_index(&req.field_name)
                .map_err(RpcError::management)
        })?;
        Ok(Response::new(proto::RemoveIndexResponse {}))
    }

    async fn add_filter(
        &self,
        request: Request<proto::AddFilterRequest>,
    ) -> Result<Response<proto::AddFilterResponse>, Status> {
        let req = request.into_inner();
        self.with_session(req.handler_id, |session| {
            session
                .table()?
                .add_filter(&req.name, &req.expression)
                .map_err(RpcError::management)
        })?;
        Ok(Response::new(proto::AddFilterResponse {}))
    }

    async fn remove_filter(
        &self,
        request: Request<proto::RemoveFilterRequest>,
    ) -> Result<Response<proto::RemoveFilterResponse>, Status> {
        let req = request.into_inner();
        self.with_session(req.handler_id, |session| {
            session
                .table()?
                .remove_filter(&req.name)
                .map_err(RpcError::management)
        })?;
        Ok(Response::new(proto::RemoveFilterResponse {}))
    }

    async fn add_trigger(
        &self,
        request: Request<proto::AddTriggerRequest>,
    ) -> Result<Response<proto::AddTriggerResponse>, Status> {
        let req = request.into_inner();
        self.with_session(req.handler_id, |session| {
            session
                .table()?
                .add_trigger(&req.name, &req.filter_name, &req.expression)
                .map_err(RpcError::management)
        })?;
        Ok(Response::new(proto::AddTriggerResponse {}))
    }

    async fn remove_trigger(
        &self,
        request: Request<proto::RemoveTriggerRequest>,
    ) -> Result<Response<proto::RemoveTriggerResponse>, Status> {
        let req = request.into_inner();
        self.with_session(req.handler_id, |session| {
            session
                .table()?
                .remove_trigger(&req.name)
                .map_err(RpcError::management)
        })?;
        Ok(Response::new(proto::RemoveTriggerResponse {}))
    }

    async fn append(
        &self,
        request: Request<proto::AppendRequest>,
    ) -> Result<Response<proto::AppendResponse>, Status> {
        let req = request.into_inner();
        let offset = self.with_session(req.handler_id, |session| {
            session.table()?.append(&req.record).map_err(RpcError::query)
        })?;
        Ok(Response::new(proto::AppendResponse { offset }))
    }

    async fn append_batch(
        &self,
        request: Request<proto::AppendBatchRequest>,
    ) -> Result<Response<proto::AppendBatchResponse>, Status> {
        let req = request.into_inner();
        let mut builder = RecordBatchBuilder::new();
        for record in req.records {
            builder.add_record(record);
        }
        let batch = builder.build();
        let first_offset = self.with_session(req.handler_id, |session| {
            session
                .table()?
                .append_batch(&batch)
                .map_err(RpcError::query)
        })?;
        Ok(Response::new(proto::AppendBatchResponse { first_offset }))
    }

    async fn read(
        &self,
        request: Request<proto::ReadRequest>,
    ) -> Result<Response<proto::ReadResponse>, Status> {
        let req = request.into_inner();
        let data = self.with_session(req.handler_id, |session| {
            session
                .table()?
                .read_range(req.offset, req.nrecords)
                .map_err(RpcError::query)
        })?;
        Ok(Response::new(proto::ReadResponse { data }))
    }

    async fn adhoc_filter(
        &self,
        request: Request<proto::AdhocFilterRequest>,
    ) -> Result<Response<IteratorHandle>, Status> {
        let req = request.into_inner();
        let page = self.with_session(req.handler_id, |session| {
            session.adhoc_filter(&req.expression)
        })?;
        Ok(Response::new(page_to_handle(page)))
    }

    async fn predef_filter(
        &self,
        request: Request<proto::PredefFilterRequest>,
    ) -> Result<Response<IteratorHandle>, Status> {
        let req = request.into_inner();
        let page = self.with_session(req.handler_id, |session| {
            session.predef_filter(&req.name, req.begin_ms, req.end_ms)
        })?;
        Ok(Response::new(page_to_handle(page)))
    }

    async fn combined_filter(
        &self,
        request: Request<proto::CombinedFilterRequest>,
    ) -> Result<Response<IteratorHandle>, Status> {
        let req = request.into_inner();
        let page = self.with_session(req.handler_id, |session| {
            session.combined_filter(&req.name, &req.expression, req.begin_ms, req.end_ms)
        })?;
        Ok(Response::new(page_to_handle(page)))
    }

    async fn alerts_by_time(
        &self,
        request: Request<proto::AlertsByTimeRequest>,
    ) -> Result<Response<IteratorHandle>, Status> {
        let req = request.into_inner();
        let page = self.with_session(req.handler_id, |session| {
            session.alerts_by_time(req.begin_ms, req.end_ms)
        })?;
        Ok(Response::new(page_to_handle(page)))
    }

    async fn get_more(
        &self,
        request: Request<proto::GetMoreRequest>,
    ) -> Result<Response<IteratorHandle>, Status> {
        let req = request.into_inner();
        let descriptor = req.descriptor.as_ref().ok_or_else(|| {
            Status::from(RpcError::InvalidOperation("Missing descriptor".into()))
        })?;
        let descriptor = descriptor_from_proto(descriptor).map_err(Status::from)?;
        let page = self.with_session(req.handler_id, |session| session.get_more(descriptor))?;
        Ok(Response::new(page_to_handle(page)))
    }

    async fn num_records(
        &self,
        request: Request<proto::NumRecordsRequest>,
    ) -> Result<Response<proto::NumRecordsResponse>, Status> {
        let req = request.into_inner();
        let count = self.with_session(req.handler_id, |session| {
            Ok(session.table()?.num_records())
        })?;
        Ok(Response::new(proto::NumRecordsResponse { count }))
    }
}
