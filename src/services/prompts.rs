//! 提示词模板
//!
//! 回复的行前缀协议（`OBS`、编号前缀、`ExpRes`）由这里的措辞约定，
//! 解析端见 [`crate::workflow::response_extractor`]。

/// 拼写纠正的系统消息
pub const SPELLING_SYSTEM: &str = "Eres un experto en pruebas de software.";

/// 反馈总结的系统消息
pub const FEEDBACK_SYSTEM: &str = "Eres un experto en pruebas de software. Tu tarea es proporcionar un feedback claro y conciso sobre las correcciones realizadas.";

/// 预期结果纠正的系统消息
pub const EXPECTED_RESULTS_SYSTEM: &str = "Eres un experto en pruebas de software. Tu tarea es corregir la ortografía y mejorar la redacción de los Expected Results, manteniendo el sentido original y usando tiempo presente.";

/// 构建拼写纠正提示词
///
/// 要求每个输入用例恰好输出一行 `OBS[n]: <说明>, <前缀><用例>`。
pub fn build_spelling_prompt(context: &str, batch: &[String], item_prefix: &str) -> String {
    format!(
        "Eres un experto en QA.\n\n\
         Objetivos:\n \
         - Corregir *solo* errores ortográficos y gramaticales leves.\n \
         - Mantener numeración y significado funcional.\n \
         - **Para cada caso de prueba recibido, devuelve exactamente una línea de salida.**\n   \
         Si un caso no necesita corrección, repítelo tal cual.\n\n\
         Formato de salida:\n \
         OBS[n]: <descripción del cambio, \"sin cambios\" o duplicado>, {prefix}<resto del caso corregido o original>\n\n\
         Historia de Usuario:\n{context}\n\n\
         Casos de prueba:\n{cases}\n\n\
         Fin de instrucción.",
        prefix = item_prefix,
        context = context,
        cases = batch.join("\n"),
    )
}

/// 构建反馈总结提示词
pub fn build_feedback_prompt(observations: &str) -> String {
    format!(
        "Aquí tienes las observaciones de corrección:\n{}\n\n\
         Devuelve únicamente el feedback en texto plano, sin formato adicional.",
        observations
    )
}

/// 预期结果纠正的两条用户消息：数据 + 输出格式要求
pub fn build_expected_results_messages(pairs_text: &str) -> [String; 2] {
    [
        format!(
            "Aquí tienes los pares Caso de Prueba + Expected Result:\n{}",
            pairs_text
        ),
        "Devuelve únicamente los Expected Results corregidos en tiempo presente, mejora la redacción y corrige la ortografía, usa mayúscula inicial. \
         En texto plano y con este formato:\n\
         ExpRes1: <texto corregido 1>\n\
         ExpRes2: <texto corregido 2>\n\
         ...\n\n\
         Al final, incluye un listado de observaciones de corrección con este formato:\n\
         OBS: <observación 1>\n\
         OBS: <observación 2>\n\
         No uses comillas ni ningún otro formato adicional."
            .to_string(),
    ]
}

/// 把配对条目压平成一行一条
///
/// 条目内部的换行会破坏"一行一条"的协议，统一替换为空格。
pub fn flatten_pairs(pairs: &[String]) -> String {
    pairs
        .iter()
        .map(|pair| pair.replace("\r\n", " ").replace('\n', " "))
        .collect::<Vec<_>>()
        .join("\n")
}
