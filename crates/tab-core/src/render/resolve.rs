//! `clean_value`: transformación recursiva dirigida por el tipo.
//!
//! | dtype        | resultado                                               |
//! |--------------|---------------------------------------------------------|
//! | Primitive    | el valor sin cambios                                    |
//! | Tab          | `Null` si el slug no existe; `TabCycle` si su shape es  |
//! |              | `None`; `TabOutputUnreachable` si no es ok; si no, el   |
//! |              | `TabOutput` cargado (puede fallar con `StaleExecution`) |
//! | Column       | el nombre si es válido, `""` si no                      |
//! | Multicolumn  | sólo las entradas válidas, en orden, con duplicados     |
//! | List/Dict/Map| misma estructura, hojas resueltas                       |

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

use super::{RenderContext, RenderParams, RenderValue};
use crate::dtype::ParamDType;
use crate::errors::RenderError;
use crate::model::StepParams;

/// Resuelve `value` según `dtype`.
///
/// `raw_params` es siempre el árbol crudo completo del step (la raíz), no el
/// subárbol de la recursión: los selectores de columnas con `tab_parameter`
/// necesitan leer el valor de ese parámetro hermano.
pub fn clean_value(dtype: &ParamDType,
                   value: &Value,
                   raw_params: &Value,
                   ctx: &RenderContext<'_>)
                   -> Result<RenderValue, RenderError> {
    match dtype {
        ParamDType::Primitive => Ok(RenderValue::Scalar(value.clone())),
        ParamDType::Tab => clean_tab(value, ctx),
        ParamDType::Column { tab_parameter } => {
            let valid = ctx.valid_colnames(tab_parameter.as_deref(), raw_params);
            let name = value.as_str().unwrap_or("");
            Ok(RenderValue::string(if valid.contains(name) { name } else { "" }))
        }
        ParamDType::Multicolumn { tab_parameter } => {
            let valid = ctx.valid_colnames(tab_parameter.as_deref(), raw_params);
            // "" nunca es un nombre válido, así que split("") no deja basura.
            let kept: Vec<&str> = value.as_str()
                                       .unwrap_or("")
                                       .split(',')
                                       .filter(|c| valid.contains(c))
                                       .collect();
            Ok(RenderValue::string(kept.join(",")))
        }
        ParamDType::List { inner } => {
            let items = value.as_array().map(Vec::as_slice).unwrap_or(&[]);
            items.iter()
                 .map(|v| clean_value(inner, v, raw_params, ctx))
                 .collect::<Result<Vec<_>, _>>()
                 .map(RenderValue::List)
        }
        ParamDType::Dict { properties } => {
            let mut out = IndexMap::new();
            if let Some(map) = value.as_object() {
                // claves que no están en el esquema se descartan
                for (key, dtype) in properties {
                    if let Some(v) = map.get(key) {
                        out.insert(key.clone(), clean_value(dtype, v, raw_params, ctx)?);
                    }
                }
            }
            Ok(RenderValue::Dict(out))
        }
        ParamDType::Map { value: value_dtype } => {
            let mut out = IndexMap::new();
            for (key, v) in value.as_object().into_iter().flatten() {
                out.insert(key.clone(), clean_value(value_dtype, v, raw_params, ctx)?);
            }
            Ok(RenderValue::Dict(out))
        }
    }
}

fn clean_tab(value: &Value, ctx: &RenderContext<'_>) -> Result<RenderValue, RenderError> {
    let slug = value.as_str().unwrap_or("");
    let shape = match ctx.tab_shapes.get(slug) {
        // tab borrado (o nunca elegido)
        None => return Ok(RenderValue::Null),
        // El driver renderiza en orden; un tab sin shape implica ciclo o
        // referencia hacia adelante.
        Some(None) => return Err(RenderError::TabCycle(slug.to_string())),
        Some(Some(shape)) => shape,
    };
    if !shape.is_ok() {
        return Err(RenderError::TabOutputUnreachable(slug.to_string()));
    }
    debug!("loading tab output workflow={} tab={slug}", ctx.workflow_id);
    ctx.loader().load(slug, shape).map(RenderValue::Tab)
}

/// Convierte los parámetros de un step en el dict que recibe `render()`.
///
/// - Parámetros `Tab` -> `TabOutput` (o `Null` si el tab ya no existe).
/// - `TabCycle` si un tab elegido no se ha renderizado.
/// - `column` -> `""` si no es una columna válida.
/// - `multicolumn` pierde los nombres que no son columnas válidas.
/// - Los secretos se agregan al final sin resolver (pisan claves iguales).
///
/// Carga datos de tabs: el workflow debe estar bloqueado mientras se llama.
pub fn get_param_values(params: &StepParams<'_>, ctx: &RenderContext<'_>) -> Result<RenderParams, RenderError> {
    let mut out = match clean_value(params.schema, params.values, params.values, ctx)? {
        RenderValue::Dict(map) => map,
        _ => IndexMap::new(),
    };
    for (key, secret) in params.secrets {
        out.insert(key.clone(), RenderValue::Scalar(secret.clone()));
    }
    Ok(out)
}
